//! Actor: an entity whose effective attributes derive from its canonical base.
//!
//! Every mutator that changes the source set (affects or equipment) ends by
//! regenerating `current` from `base`. Nothing adds into `current` directly.

use std::sync::Arc;

use bitflags::bitflags;
use strum::{Display, EnumIter};

use super::equipment::{Equipment, Item, ItemRestrictions, WearSlot};
use super::position::{Alignment, Position};
use super::session::CastingSession;
use crate::affect::{AffectFlags, AffectId, AffectRecord, AffectStore, JoinPolicy};
use crate::state::{ActorId, EquipError, GroupId, RoomId, SpellId};
use crate::stats::{self, Attributes};

/// Player or non-player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorKind {
    #[default]
    Player,
    Npc,
}

/// Class whose spell list and levels a cast draws on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastClass {
    #[default]
    Wizard,
    Sorcerer,
    Bard,
    Cleric,
    Druid,
    Paladin,
    Ranger,
}

impl CastClass {
    pub const fn is_divine(self) -> bool {
        matches!(
            self,
            CastClass::Cleric | CastClass::Druid | CastClass::Paladin | CastClass::Ranger
        )
    }

    /// Casts without preparation; maximized casts take longer.
    pub const fn is_spontaneous(self) -> bool {
        matches!(self, CastClass::Sorcerer | CastClass::Bard)
    }
}

/// Caster levels by tradition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CasterLevels {
    pub arcane: u8,
    pub divine: u8,
}

impl CasterLevels {
    /// Combined caster level used for every check.
    pub fn combined(self) -> i32 {
        i32::from(self.arcane) + i32::from(self.divine)
    }

    pub fn for_class(self, class: CastClass) -> u8 {
        if class.is_divine() {
            self.divine
        } else {
            self.arcane
        }
    }
}

bitflags! {
    /// Trained traits that feed the rules checks.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Feats: u32 {
        const COMBAT_CASTING = 1 << 0;
        const QUICK_CHANT = 1 << 1;
        const WIZ_CHANT = 1 << 2;
        const SPELL_PENETRATION = 1 << 3;
        const GREATER_SPELL_PENETRATION = 1 << 4;
        const EPIC_SPELL_PENETRATION = 1 << 5;
        const GREAT_FORTITUDE = 1 << 6;
        const EPIC_FORTITUDE = 1 << 7;
        const LIGHTNING_REFLEXES = 1 << 8;
        const EPIC_REFLEXES = 1 << 9;
        const IRON_WILL = 1 << 10;
        const EPIC_WILL = 1 << 11;
        const LUCK_OF_HEROES = 1 << 12;
        const DIAMOND_SOUL = 1 << 13;
        const ARCANE_APOTHEOSIS = 1 << 14;
    }
}

/// A simulated character.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    /// Alignment score in -1000..=1000.
    pub alignment: i32,
    pub room: RoomId,
    pub position: Position,
    pub level: u8,
    pub casting_class: CastClass,
    pub caster_levels: CasterLevels,
    pub feats: Feats,
    /// Ranks of improved spell resistance.
    pub spell_resistance_ranks: u8,
    /// Ranks in the concentration skill.
    pub concentration: i32,
    /// Combat maneuver bonus of whoever is holding this actor, if held.
    pub grapple_cmb: i32,
    pub fighting: Option<ActorId>,
    /// True when this actor is the one its opponent is attacking.
    pub tanking: bool,
    pub group: Option<GroupId>,
    pub master: Option<ActorId>,
    pub hit: i32,
    pub psp: i32,

    base: Attributes,
    #[cfg_attr(feature = "serde", serde(skip))]
    current: Attributes,
    affects: AffectStore,
    equipment: Equipment,
    #[cfg_attr(feature = "serde", serde(skip))]
    casting: Option<CastingSession>,
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>, kind: ActorKind, base: Attributes) -> Self {
        let mut actor = Self {
            id,
            name: name.into(),
            kind,
            alignment: 0,
            room: RoomId::default(),
            position: Position::Standing,
            level: 1,
            casting_class: CastClass::default(),
            caster_levels: CasterLevels::default(),
            feats: Feats::empty(),
            spell_resistance_ranks: 0,
            concentration: 0,
            grapple_cmb: 0,
            fighting: None,
            tanking: false,
            group: None,
            master: None,
            hit: base.max_hit,
            psp: base.max_psp,
            current: base.clone(),
            base,
            affects: AffectStore::new(),
            equipment: Equipment::default(),
            casting: None,
        };
        actor.recompute();
        actor
    }

    // ========================================================================
    // Builder helpers
    // ========================================================================

    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self.recompute();
        self
    }

    #[must_use]
    pub fn with_caster(mut self, class: CastClass, levels: CasterLevels) -> Self {
        self.casting_class = class;
        self.caster_levels = levels;
        self
    }

    #[must_use]
    pub fn with_feats(mut self, feats: Feats) -> Self {
        self.feats |= feats;
        self
    }

    #[must_use]
    pub fn in_room(mut self, room: RoomId) -> Self {
        self.room = room;
        self
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: i32) -> Self {
        self.alignment = alignment;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_npc(&self) -> bool {
        self.kind == ActorKind::Npc
    }

    pub fn base(&self) -> &Attributes {
        &self.base
    }

    /// Effective attributes. Always consistent with base and sources.
    pub fn current(&self) -> &Attributes {
        &self.current
    }

    pub fn affects(&self) -> &AffectStore {
        &self.affects
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn casting(&self) -> Option<&CastingSession> {
        self.casting.as_ref()
    }

    pub fn is_casting(&self) -> bool {
        self.casting.is_some()
    }

    /// True if any of `flags` is currently imposed.
    pub fn has_any(&self, flags: AffectFlags) -> bool {
        self.current.flags.intersects(flags)
    }

    pub fn affected_by(&self, spell: SpellId) -> bool {
        self.affects.affected_by(spell)
    }

    pub fn alignment_class(&self) -> Alignment {
        Alignment::from_score(self.alignment)
    }

    /// Level used by every magic check. Non-players cast at their level.
    pub fn caster_level(&self) -> i32 {
        match self.kind {
            ActorKind::Player => self.caster_levels.combined(),
            ActorKind::Npc => i32::from(self.level),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.position == Position::Dead
    }

    // ========================================================================
    // Mutators (every one regenerates `current`)
    // ========================================================================

    /// Edits the canonical base, then regenerates `current`.
    pub fn update_base(&mut self, edit: impl FnOnce(&mut Attributes)) {
        edit(&mut self.base);
        self.recompute();
    }

    pub fn add_affect(&mut self, record: AffectRecord) -> AffectId {
        let id = self.affects.add(record);
        self.recompute();
        id
    }

    pub fn join_affect(&mut self, record: AffectRecord, policy: JoinPolicy) -> AffectId {
        let id = self.affects.join(record, policy);
        self.recompute();
        id
    }

    pub fn remove_affect(&mut self, id: AffectId) -> Option<AffectRecord> {
        let removed = self.affects.remove(id);
        if removed.is_some() {
            self.recompute();
        }
        removed
    }

    /// Removes every affect from `spell`. Returns how many were removed.
    pub fn strip_spell(&mut self, spell: SpellId) -> usize {
        let removed = self.affects.remove_spell(spell);
        if removed > 0 {
            self.recompute();
        }
        removed
    }

    /// Removes every affect that imposes any of `flags`.
    pub fn strip_flagged(&mut self, flags: AffectFlags) -> usize {
        let ids: Vec<AffectId> = self
            .affects
            .iter()
            .filter(|entry| entry.record.flags.intersects(flags))
            .map(|entry| entry.id)
            .collect();
        for id in &ids {
            self.affects.remove(*id);
        }
        if !ids.is_empty() {
            self.recompute();
        }
        ids.len()
    }

    /// Advances affect durations by one pulse. Returns the spells that wore off.
    pub fn decrement_affects(&mut self) -> Vec<SpellId> {
        let worn_off = self.affects.decrement();
        self.recompute();
        worn_off
    }

    /// Wears `item` in `slot`.
    ///
    /// Restricted items are rejected before they ever enter recomputation.
    pub fn equip(&mut self, item: Arc<Item>, slot: WearSlot) -> Result<(), EquipError> {
        if let Some(reason) = self.restriction_violation(&item) {
            return Err(EquipError::Restricted {
                item: item.id,
                actor: self.id,
                reason,
            });
        }
        if self.equipment.is_wearing(item.id) {
            return Err(EquipError::AlreadyWorn { item: item.id });
        }
        self.equipment
            .put(slot, item)
            .map_err(|_| EquipError::SlotOccupied { slot })?;
        self.recompute();
        Ok(())
    }

    /// Removes whatever is worn in `slot`.
    pub fn unequip(&mut self, slot: WearSlot) -> Result<Arc<Item>, EquipError> {
        let item = self
            .equipment
            .take(slot)
            .ok_or(EquipError::SlotEmpty { slot })?;
        self.recompute();
        Ok(item)
    }

    fn restriction_violation(&self, item: &Item) -> Option<&'static str> {
        let r = item.restrictions;
        match self.alignment_class() {
            Alignment::Good if r.contains(ItemRestrictions::ANTI_GOOD) => {
                return Some("you are zapped by the item (good)");
            }
            Alignment::Evil if r.contains(ItemRestrictions::ANTI_EVIL) => {
                return Some("you are zapped by the item (evil)");
            }
            Alignment::Neutral if r.contains(ItemRestrictions::ANTI_NEUTRAL) => {
                return Some("you are zapped by the item (neutral)");
            }
            _ => {}
        }
        if self.kind == ActorKind::Npc {
            return None;
        }
        if self.casting_class.is_divine() && r.contains(ItemRestrictions::ANTI_DIVINE) {
            return Some("your class cannot use this item");
        }
        if !self.casting_class.is_divine() && r.contains(ItemRestrictions::ANTI_ARCANE) {
            return Some("your class cannot use this item");
        }
        None
    }

    /// Regenerates `current` from `base` and every active source.
    pub fn recompute(&mut self) {
        match stats::recompute(
            self.id,
            self.kind,
            self.level,
            &self.base,
            &self.affects,
            &self.equipment,
        ) {
            Ok(current) => self.current = current,
            Err(error) => tracing::error!(actor = %self.id, %error, "recompute skipped"),
        }
    }

    /// Re-derives state skipped by persistence. Call after deserializing.
    pub fn restore(&mut self) {
        self.casting = None;
        self.recompute();
    }

    // ========================================================================
    // Casting session ownership
    // ========================================================================

    pub(crate) fn casting_mut(&mut self) -> Option<&mut CastingSession> {
        self.casting.as_mut()
    }

    pub(crate) fn start_casting(&mut self, session: CastingSession) {
        self.casting = Some(session);
    }

    /// Drops the session, if any.
    pub(crate) fn clear_casting(&mut self) -> Option<CastingSession> {
        self.casting.take()
    }
}
