//! A single timed effect instance on an actor.

use super::{AffectFlags, ApplyType, BonusCategory};
use crate::state::SpellId;

/// Stable handle of an affect inside its owner's store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffectId(pub u32);

/// Remaining lifetime of an affect, in affect pulses.
///
/// `-1` (or any negative value) is permanent until removed, `0` expires on the
/// next decrement.
pub type Duration = i32;

/// One timed, typed modifier or status applied to an actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffectRecord {
    pub spell: SpellId,
    pub location: ApplyType,
    pub modifier: i32,
    pub bonus: BonusCategory,
    pub duration: Duration,
    pub flags: AffectFlags,
}

impl AffectRecord {
    pub const PERMANENT: Duration = -1;

    pub fn new(spell: SpellId, location: ApplyType, modifier: i32, duration: Duration) -> Self {
        Self {
            spell,
            location,
            modifier,
            bonus: BonusCategory::Undefined,
            duration,
            flags: AffectFlags::empty(),
        }
    }

    /// A record that only imposes status flags.
    pub fn status(spell: SpellId, flags: AffectFlags, duration: Duration) -> Self {
        Self {
            flags,
            ..Self::new(spell, ApplyType::None, 0, duration)
        }
    }

    #[must_use]
    pub fn with_bonus(mut self, bonus: BonusCategory) -> Self {
        self.bonus = bonus;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: AffectFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_permanent(&self) -> bool {
        self.duration < 0
    }
}

/// Merge policy for [`AffectStore::join`](super::AffectStore::join).
///
/// Adding wins over averaging when both are set for the same field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinPolicy {
    pub add_duration: bool,
    pub average_duration: bool,
    pub add_modifier: bool,
    pub average_modifier: bool,
}

impl JoinPolicy {
    /// Replace any existing record of the same spell and slot.
    pub const REFRESH: Self = Self {
        add_duration: false,
        average_duration: false,
        add_modifier: false,
        average_modifier: false,
    };

    /// Extend duration and accumulate the modifier.
    pub const ACCUMULATE: Self = Self {
        add_duration: true,
        average_duration: false,
        add_modifier: true,
        average_modifier: false,
    };

    pub(crate) fn merge(&self, incoming: &mut AffectRecord, existing: &AffectRecord) {
        if self.add_duration {
            incoming.duration += existing.duration;
        } else if self.average_duration {
            incoming.duration = (incoming.duration + existing.duration) / 2;
        }
        if self.add_modifier {
            incoming.modifier += existing.modifier;
        } else if self.average_modifier {
            incoming.modifier = (incoming.modifier + existing.modifier) / 2;
        }
    }
}
