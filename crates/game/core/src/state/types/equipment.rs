//! Worn equipment: slot bindings between an actor and shared item definitions.
//!
//! Items are owned by the world/inventory subsystem. An actor only holds an
//! `Arc` to the worn item, and an item is worn in at most one slot.

use std::sync::Arc;

use arrayvec::ArrayVec;
use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter};

use crate::affect::{AffectFlags, ApplyType, BonusCategory};
use crate::config::RulesConfig;
use crate::state::ItemId;

/// Equipment location on an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WearSlot {
    Light,
    FingerRight,
    FingerLeft,
    Neck1,
    Neck2,
    Body,
    Head,
    Legs,
    Feet,
    Hands,
    Arms,
    Shield,
    About,
    Waist,
    WristRight,
    WristLeft,
    Wield,
    Hold,
    WieldOffhand,
    HoldOffhand,
    WieldTwoHanded,
    HoldTwoHanded,
    Face,
}

const _: () = assert!(WearSlot::COUNT == RulesConfig::NUM_WEAR_SLOTS);

impl WearSlot {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Modifier entry on an item, structurally an affect record without duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemAffect {
    pub location: ApplyType,
    pub modifier: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus: BonusCategory,
}

bitflags! {
    /// Who may wear an item.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct ItemRestrictions: u16 {
        const ANTI_GOOD = 1 << 0;
        const ANTI_EVIL = 1 << 1;
        const ANTI_NEUTRAL = 1 << 2;
        const ANTI_ARCANE = 1 << 3;
        const ANTI_DIVINE = 1 << 4;
    }
}

/// Item definition as seen by the rules core.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub affects: ArrayVec<ItemAffect, { RulesConfig::MAX_ITEM_AFFECTS }>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: AffectFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub restrictions: ItemRestrictions,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            affects: ArrayVec::new(),
            flags: AffectFlags::empty(),
            restrictions: ItemRestrictions::empty(),
        }
    }

    /// Adds a modifier entry. Entries beyond the item's capacity are dropped.
    #[must_use]
    pub fn with_affect(mut self, location: ApplyType, modifier: i32, bonus: BonusCategory) -> Self {
        if self
            .affects
            .try_push(ItemAffect {
                location,
                modifier,
                bonus,
            })
            .is_err()
        {
            tracing::warn!(item = %self.id, "item affect capacity exceeded, entry dropped");
        }
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: AffectFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn with_restrictions(mut self, restrictions: ItemRestrictions) -> Self {
        self.restrictions |= restrictions;
        self
    }
}

/// Slot table of worn items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    slots: [Option<Arc<Item>>; RulesConfig::NUM_WEAR_SLOTS],
}

impl Equipment {
    pub fn get(&self, slot: WearSlot) -> Option<&Arc<Item>> {
        self.slots[slot.index()].as_ref()
    }

    /// Binds an item into an empty slot.
    pub(crate) fn put(&mut self, slot: WearSlot, item: Arc<Item>) -> Result<(), Arc<Item>> {
        let cell = &mut self.slots[slot.index()];
        if cell.is_some() {
            return Err(item);
        }
        *cell = Some(item);
        Ok(())
    }

    pub(crate) fn take(&mut self, slot: WearSlot) -> Option<Arc<Item>> {
        self.slots[slot.index()].take()
    }

    /// Returns true if `item` is already worn in any slot.
    pub fn is_wearing(&self, item: ItemId) -> bool {
        self.worn().any(|(_, worn)| worn.id == item)
    }

    /// Worn items in slot order.
    pub fn worn(&self) -> impl Iterator<Item = (WearSlot, &Arc<Item>)> {
        use strum::IntoEnumIterator;
        WearSlot::iter().filter_map(|slot| self.get(slot).map(|item| (slot, item)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
