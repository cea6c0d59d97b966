//! Actor state.
//!
//! This module owns actors, their worn equipment, their casting sessions and
//! the id-keyed table the scheduler iterates. Attribute derivation lives in
//! [`crate::stats`]; affect records live in [`crate::affect`].
mod error;
mod table;
pub mod types;

pub use error::{EquipError, RecomputeError};
pub use table::ActorTable;
pub use types::{
    Actor, ActorId, ActorKind, Alignment, CastClass, CastTarget, CasterLevels, CastingSession,
    CastingState, Equipment, Feats, GroupId, Item, ItemAffect, ItemId, ItemRestrictions,
    Metamagic, Position, RoomId, SpellId, Tick, WearSlot,
};
