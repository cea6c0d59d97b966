//! Per-spell effects that fit no generic routine.

use std::collections::HashMap;

use super::routine::{RoutineContext, RoutineOutcome};
use crate::state::SpellId;

/// A hand-written spell effect.
pub type ManualEffect = Box<dyn Fn(&mut RoutineContext<'_>) -> RoutineOutcome + Send + Sync>;

/// Manual effects keyed by spell.
#[derive(Default)]
pub struct ManualEffects {
    effects: HashMap<SpellId, ManualEffect>,
}

impl ManualEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `effect` for `spell`, replacing any earlier one.
    pub fn register<F>(&mut self, spell: SpellId, effect: F)
    where
        F: Fn(&mut RoutineContext<'_>) -> RoutineOutcome + Send + Sync + 'static,
    {
        self.effects.insert(spell, Box::new(effect));
    }

    #[must_use]
    pub fn with<F>(mut self, spell: SpellId, effect: F) -> Self
    where
        F: Fn(&mut RoutineContext<'_>) -> RoutineOutcome + Send + Sync + 'static,
    {
        self.register(spell, effect);
        self
    }

    pub fn get(&self, spell: SpellId) -> Option<&ManualEffect> {
        self.effects.get(&spell)
    }

    pub fn contains(&self, spell: SpellId) -> bool {
        self.effects.contains_key(&spell)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl std::fmt::Debug for ManualEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.effects.keys()).finish()
    }
}
