//! The per-tick entry point.
//!
//! One authoritative tick source calls [`Scheduler::tick`] once per simulated
//! second. Casting sessions advance every tick; affect durations decay and
//! attributes are swept on every `affect_pulse`-th tick.

use tracing::trace;

use crate::env::{Narration, RulesEnv};
use crate::magic::{CastOutcome, advance};
use crate::state::{ActorId, ActorTable, SpellId, Tick};

/// What one tick did to one actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorTick {
    pub actor: ActorId,
    pub cast: CastOutcome,
    pub worn_off: Vec<SpellId>,
}

impl ActorTick {
    fn is_quiet(&self) -> bool {
        self.cast == CastOutcome::Idle && self.worn_off.is_empty()
    }
}

/// What one tick did to the world. Quiet actors are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub now: Tick,
    pub pulse: bool,
    pub actors: Vec<ActorTick>,
}

impl TickReport {
    pub fn for_actor(&self, actor: ActorId) -> Option<&ActorTick> {
        self.actors.iter().find(|tick| tick.actor == actor)
    }
}

/// Drives casting and affect decay.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scheduler;

impl Scheduler {
    /// Advances every actor by one tick, in id order.
    pub fn tick(env: RulesEnv<'_>, actors: &mut ActorTable, now: Tick) -> TickReport {
        let pulse = now.is_pulse(env.config().affect_pulse);
        let mut report = TickReport {
            now,
            pulse,
            actors: Vec::new(),
        };
        for id in actors.ids() {
            let tick = Self::step(env, actors, id, now, pulse);
            if !tick.is_quiet() {
                report.actors.push(tick);
            }
        }
        trace!(tick = now.0, pulse, changed = report.actors.len(), "tick");
        report
    }

    /// Advances a single actor by one tick.
    pub fn tick_actor(env: RulesEnv<'_>, actors: &mut ActorTable, id: ActorId, now: Tick) -> ActorTick {
        let pulse = now.is_pulse(env.config().affect_pulse);
        Self::step(env, actors, id, now, pulse)
    }

    fn step(env: RulesEnv<'_>, actors: &mut ActorTable, id: ActorId, now: Tick, pulse: bool) -> ActorTick {
        let cast = advance(env, actors, id, now);
        let mut worn_off = Vec::new();
        if pulse {
            if let Some(actor) = actors.get_mut(id) {
                worn_off = actor.decrement_affects();
            }
            for spell in &worn_off {
                env.narrate(Narration::WoreOff {
                    actor: id,
                    spell: *spell,
                });
            }
        }
        ActorTick {
            actor: id,
            cast,
            worn_off,
        }
    }
}
