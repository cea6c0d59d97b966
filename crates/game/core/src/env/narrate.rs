//! Narration callback.
//!
//! The rules core reports what happened; the collaborator behind [`Narrator`]
//! turns it into player-facing text. Narration cannot change outcomes.

use std::sync::Mutex;

use crate::affect::SaveKind;
use crate::magic::{Interruption, RoutineKind, SpellSchool};
use crate::state::{ActorId, CastTarget, SpellId};

/// Something the rules core wants told.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Narration {
    /// A multi-tick cast has started.
    CastBegin {
        caster: ActorId,
        spell: SpellId,
        school: SpellSchool,
        target: CastTarget,
    },
    /// A cast survived another tick.
    CastProgress {
        caster: ActorId,
        spell: SpellId,
        ticks_remaining: u32,
    },
    /// A cast resolved and its routines are about to run.
    CastComplete {
        caster: ActorId,
        spell: SpellId,
        school: SpellSchool,
        target: CastTarget,
    },
    /// The caster cancelled ("You abort your spell.").
    CastAborted { caster: ActorId, spell: SpellId },
    /// Validation or concentration failed mid-cast.
    CastInterrupted {
        caster: ActorId,
        spell: SpellId,
        reason: Interruption,
    },
    /// A command was refused; `message` is the one-line reason.
    Rejected {
        actor: ActorId,
        message: &'static str,
    },
    /// A routine changed something on `target`.
    EffectApplied {
        caster: ActorId,
        target: ActorId,
        spell: SpellId,
        school: SpellSchool,
        routine: RoutineKind,
        amount: i32,
    },
    /// Spell resistance negated the effect.
    Resisted {
        caster: ActorId,
        target: ActorId,
        spell: SpellId,
    },
    /// The target made its saving throw.
    Saved {
        caster: ActorId,
        target: ActorId,
        spell: SpellId,
        kind: SaveKind,
    },
    /// A protective effect stopped the spell before any routine ran.
    Absorbed {
        caster: ActorId,
        target: Option<ActorId>,
        spell: SpellId,
        message: &'static str,
    },
    /// Spell turning sent the spell back at its caster.
    Turned {
        caster: ActorId,
        target: ActorId,
        spell: SpellId,
    },
    /// An affect on `actor` expired.
    WoreOff { actor: ActorId, spell: SpellId },
}

/// Receives narration. Implementations must not block.
pub trait Narrator: Send + Sync {
    fn narrate(&self, event: Narration);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNarrator;

impl Narrator for NullNarrator {
    fn narrate(&self, _event: Narration) {}
}

/// Keeps every event in order. Useful for replays and tests.
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    events: Mutex<Vec<Narration>>,
}

impl RecordingNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns everything recorded so far.
    pub fn take(&self) -> Vec<Narration> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn count(&self, pred: impl Fn(&Narration) -> bool) -> usize {
        match self.events.lock() {
            Ok(events) => events.iter().filter(|e| pred(e)).count(),
            Err(poisoned) => poisoned.into_inner().iter().filter(|e| pred(e)).count(),
        }
    }
}

impl Narrator for RecordingNarrator {
    fn narrate(&self, event: Narration) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
