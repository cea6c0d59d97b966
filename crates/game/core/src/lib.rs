//! Deterministic rules core for a text-based multi-user dungeon.
//!
//! `mud-core` owns the game rules that change an actor's numbers: affect
//! records and their stacking, attribute recomputation, spell resolution
//! checks, the casting state machine and the per-tick scheduler. Everything
//! else (rooms, items at rest, text) is a collaborator reached through the
//! traits in [`env`].
//!
//! All state mutation for one actor happens synchronously inside the tick
//! that triggers it; [`scheduler::Scheduler::tick`] is the single entry point
//! a host calls once per simulated second.
pub mod affect;
pub mod config;
pub mod env;
pub mod error;
pub mod magic;
pub mod scheduler;
pub mod state;
pub mod stats;

pub use affect::{
    AffectEntry, AffectFlags, AffectId, AffectRecord, AffectStore, ApplyType, BonusCategory,
    DamageType, Duration, JoinPolicy, SaveKind,
};
pub use config::RulesConfig;
pub use env::{
    CooldownLedger, Dice, ItemLocation, MemoryLedger, Narration, Narrator, NullNarrator,
    OracleError, PcgRng, RecordingNarrator, RngOracle, RulesEnv, WorldOracle, WorldRequest,
};
pub use error::{ErrorSeverity, GameError};
pub use magic::{
    CastError, CastOutcome, CastRequest, DispatchReport, Interruption, ManualEffects,
    RoutineContext, RoutineFlags, RoutineKind, RoutineOutcome, SpellDescriptor, SpellOracle,
    SpellRegistry, SpellSchool, TargetFlags, abort_cast, advance, begin_cast, call_magic,
};
pub use scheduler::{ActorTick, Scheduler, TickReport};
pub use state::{
    Actor, ActorId, ActorKind, ActorTable, Alignment, CastClass, CastTarget, CasterLevels,
    CastingSession, CastingState, EquipError, Equipment, Feats, GroupId, Item, ItemAffect, ItemId,
    ItemRestrictions, Metamagic, Position, RecomputeError, RoomId, SpellId, Tick, WearSlot,
};
pub use stats::{Abilities, Attributes, Size, ability_bonus};
