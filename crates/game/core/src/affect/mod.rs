//! Affect records: timed, typed modifiers and status flags on an actor.
mod apply;
mod bonus;
mod flags;
mod record;
mod store;

pub use apply::{ApplyType, DamageType, SaveKind};
pub use bonus::BonusCategory;
pub use flags::AffectFlags;
pub use record::{AffectId, AffectRecord, Duration, JoinPolicy};
pub use store::{AffectEntry, AffectStore};
