//! Cooldown ledger backing epic spells.

use mud_core::{ActorId, CooldownLedger, MemoryLedger, RulesConfig, SpellId, Tick};
use tracing::debug;

/// Mutex-protected use ledger sized from [`RulesConfig`].
///
/// Each actor gets `epic_daily_uses` casts of each epic spell per
/// `epic_cooldown_ticks`.
#[derive(Debug)]
pub struct InMemoryLedger {
    inner: MemoryLedger,
}

impl InMemoryLedger {
    pub fn new(daily_uses: u32, window: u64) -> Self {
        Self {
            inner: MemoryLedger::new(daily_uses, window),
        }
    }

    pub fn from_config(config: &RulesConfig) -> Self {
        Self::new(config.epic_daily_uses, config.epic_cooldown_ticks)
    }
}

impl CooldownLedger for InMemoryLedger {
    fn uses_remaining(&self, actor: ActorId, spell: SpellId, now: Tick) -> u32 {
        self.inner.uses_remaining(actor, spell, now)
    }

    fn record_use(&self, actor: ActorId, spell: SpellId, now: Tick) {
        self.inner.record_use(actor, spell, now);
        debug!(
            target: "runtime::ledger",
            actor = %actor,
            spell = %spell,
            tick = now.0,
            "epic use recorded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_from_config() {
        let config = RulesConfig {
            epic_daily_uses: 2,
            epic_cooldown_ticks: 10,
            ..RulesConfig::default()
        };
        let ledger = InMemoryLedger::from_config(&config);
        let (actor, spell) = (ActorId(1), SpellId(500));

        ledger.record_use(actor, spell, Tick(0));
        assert_eq!(ledger.uses_remaining(actor, spell, Tick(1)), 1);
        ledger.record_use(actor, spell, Tick(2));
        assert_eq!(ledger.uses_remaining(actor, spell, Tick(3)), 0);
        assert_eq!(ledger.uses_remaining(actor, spell, Tick(12)), 2);
    }
}
