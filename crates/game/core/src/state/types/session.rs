//! In-progress cast owned by an actor.

use bitflags::bitflags;

use super::actor::CastClass;
use crate::state::{ActorId, ItemId, SpellId};

bitflags! {
    /// Independent toggles that change how one cast behaves.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Metamagic: u8 {
        const QUICKEN = 1 << 0;
        const MAXIMIZE = 1 << 1;
        const HEIGHTEN = 1 << 2;
        const EMPOWER = 1 << 3;
        const SILENT = 1 << 4;
        const STILL = 1 << 5;
        const EXTEND = 1 << 6;
        /// Marker with no effect outside cast-time calculation.
        const ARCANE_ADEPT = 1 << 7;
    }
}

/// What a cast is aimed at. Actor and item targets are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastTarget {
    #[default]
    None,
    Actor(ActorId),
    Item(ItemId),
}

impl CastTarget {
    pub fn actor(self) -> Option<ActorId> {
        match self {
            CastTarget::Actor(id) => Some(id),
            _ => None,
        }
    }

    pub fn item(self) -> Option<ItemId> {
        match self {
            CastTarget::Item(id) => Some(id),
            _ => None,
        }
    }
}

/// Live state of a multi-tick cast.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastingSession {
    pub spell: SpellId,
    pub target: CastTarget,
    pub ticks_remaining: u32,
    pub total_ticks: u32,
    pub metamagic: Metamagic,
    pub class: CastClass,
}

impl CastingSession {
    /// Number of progress stars to show, one per remaining tick.
    pub fn progress_marks(&self) -> usize {
        self.ticks_remaining as usize
    }
}

/// Observable phase of an actor's casting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastingState {
    Idle,
    Casting(u32),
    Completing,
}

impl CastingState {
    pub fn of(session: Option<&CastingSession>) -> Self {
        match session {
            None => CastingState::Idle,
            Some(s) if s.ticks_remaining == 0 => CastingState::Completing,
            Some(s) => CastingState::Casting(s.ticks_remaining),
        }
    }
}
