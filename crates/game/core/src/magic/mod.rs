//! Spells: descriptors, resolution checks, effect routines and casting.
//!
//! [`begin_cast`] validates a request and opens a session on the caster;
//! the scheduler calls [`advance`] once per tick until the session completes
//! and [`call_magic`] runs the spell's routines.
mod casting;
mod checks;
mod dispatch;
mod error;
mod manual;
mod routine;
mod spell;

pub use casting::{CastOutcome, CastRequest, Interruption, abort_cast, advance, begin_cast};
pub use checks::{ResistCheck, SaveCheck, resist, save, save_bonus, spell_resistance};
pub use dispatch::{Blocked, DispatchReport, Invocation, call_magic};
pub use error::CastError;
pub use manual::{ManualEffect, ManualEffects};
pub use routine::{
    AffectsRoutine, AreasRoutine, DamageRoutine, EffectRoutine, GroupsRoutine, ManualRoutine,
    MassesRoutine, PointsRoutine, RoutineContext, RoutineKind, RoutineOutcome, UnaffectsRoutine,
    WorldRoutine, routine_for,
};
pub use spell::{
    AffectTemplate, DamageSpec, PointsSpec, RoutineFlags, SpellDescriptor, SpellOracle,
    SpellRegistry, SpellSchool, TargetFlags,
};
