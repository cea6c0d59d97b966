mod actor;
mod common;
mod equipment;
mod position;
mod session;

pub use actor::{Actor, ActorKind, CastClass, CasterLevels, Feats};
pub use common::{ActorId, GroupId, ItemId, RoomId, SpellId, Tick};
pub use equipment::{Equipment, Item, ItemAffect, ItemRestrictions, WearSlot};
pub use position::{Alignment, Position};
pub use session::{CastTarget, CastingSession, CastingState, Metamagic};
