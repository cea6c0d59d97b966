//! World collaborator: item whereabouts and world-level routines.

use crate::magic::{RoutineKind, RoutineOutcome};
use crate::state::{ActorId, CastTarget, ItemId, RoomId, SpellId};

/// Where an item currently is. An item is in exactly one place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemLocation {
    Room(RoomId),
    Carried(ActorId),
    Worn(ActorId),
    Contained(ItemId),
}

/// Parameters for a routine the world performs on the core's behalf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldRequest {
    pub caster: ActorId,
    pub room: RoomId,
    pub spell: SpellId,
    pub level: i32,
    pub target: CastTarget,
}

/// Rooms, items and creatures live outside the rules core.
///
/// Every method has a neutral default so partial worlds are easy to supply.
pub trait WorldOracle: Send + Sync {
    fn item_location(&self, _item: ItemId) -> Option<ItemLocation> {
        None
    }

    /// True if no words can be spoken in `room`.
    fn is_soundproof(&self, _room: RoomId) -> bool {
        false
    }

    /// Runs an object, summon, creation or room routine.
    fn apply_routine(&self, _kind: RoutineKind, _request: &WorldRequest) -> RoutineOutcome {
        RoutineOutcome::NoEffect
    }
}
