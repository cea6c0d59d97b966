//! Daily-use ledger for rare abilities.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::state::{ActorId, SpellId, Tick};

/// Tracks per-actor, per-spell uses inside a rolling window.
///
/// The core asks before allowing a cast and reports every successful cast.
pub trait CooldownLedger: Send + Sync {
    fn uses_remaining(&self, actor: ActorId, spell: SpellId, now: Tick) -> u32;
    fn record_use(&self, actor: ActorId, spell: SpellId, now: Tick);
}

/// In-memory ledger: `daily_uses` per `window` ticks.
#[derive(Debug)]
pub struct MemoryLedger {
    daily_uses: u32,
    window: u64,
    uses: Mutex<HashMap<(ActorId, SpellId), Vec<Tick>>>,
}

impl MemoryLedger {
    pub fn new(daily_uses: u32, window: u64) -> Self {
        Self {
            daily_uses,
            window,
            uses: Mutex::new(HashMap::new()),
        }
    }

    fn live_uses(&self, ticks: &[Tick], now: Tick) -> u32 {
        ticks
            .iter()
            .filter(|used| now.0.saturating_sub(used.0) < self.window)
            .count() as u32
    }
}

impl CooldownLedger for MemoryLedger {
    fn uses_remaining(&self, actor: ActorId, spell: SpellId, now: Tick) -> u32 {
        let uses = match self.uses.lock() {
            Ok(uses) => uses,
            Err(poisoned) => poisoned.into_inner(),
        };
        let spent = uses
            .get(&(actor, spell))
            .map_or(0, |ticks| self.live_uses(ticks, now));
        self.daily_uses.saturating_sub(spent)
    }

    fn record_use(&self, actor: ActorId, spell: SpellId, now: Tick) {
        let mut uses = match self.uses.lock() {
            Ok(uses) => uses,
            Err(poisoned) => poisoned.into_inner(),
        };
        let window = self.window;
        let ticks = uses.entry((actor, spell)).or_default();
        ticks.retain(|used| now.0.saturating_sub(used.0) < window);
        ticks.push(now);
    }
}
