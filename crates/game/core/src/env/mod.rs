//! Collaborators the rules core consults but does not own.
//!
//! The spell registry, dice, narration, cooldown ledger, world and manual
//! effect table all live behind traits. [`RulesEnv`] bundles borrowed
//! references to them so every operation receives one value instead of six.
mod error;
mod ledger;
mod narrate;
mod rng;
mod world;

pub use error::OracleError;
pub use ledger::{CooldownLedger, MemoryLedger};
pub use narrate::{Narration, Narrator, NullNarrator, RecordingNarrator};
pub use rng::{Dice, PcgRng, RngOracle, compute_seed};
pub use world::{ItemLocation, WorldOracle, WorldRequest};

use crate::config::RulesConfig;
use crate::magic::{ManualEffects, SpellOracle};
use crate::state::{ActorId, Tick};

/// Aggregates the collaborators required by casting, dispatch and the scheduler.
#[derive(Clone, Copy)]
pub struct RulesEnv<'a> {
    config: &'a RulesConfig,
    spells: Option<&'a dyn SpellOracle>,
    rng: Option<&'a dyn RngOracle>,
    narrator: Option<&'a dyn Narrator>,
    ledger: Option<&'a dyn CooldownLedger>,
    world: Option<&'a dyn WorldOracle>,
    manual: Option<&'a ManualEffects>,
}

impl<'a> RulesEnv<'a> {
    pub fn new(config: &'a RulesConfig) -> Self {
        Self {
            config,
            spells: None,
            rng: None,
            narrator: None,
            ledger: None,
            world: None,
            manual: None,
        }
    }

    /// Environment with a registry and dice; enough to resolve any cast.
    pub fn with_all(
        config: &'a RulesConfig,
        spells: &'a dyn SpellOracle,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self::new(config).with_spells(spells).with_rng(rng)
    }

    #[must_use]
    pub fn with_spells(mut self, spells: &'a dyn SpellOracle) -> Self {
        self.spells = Some(spells);
        self
    }

    #[must_use]
    pub fn with_rng(mut self, rng: &'a dyn RngOracle) -> Self {
        self.rng = Some(rng);
        self
    }

    #[must_use]
    pub fn with_narrator(mut self, narrator: &'a dyn Narrator) -> Self {
        self.narrator = Some(narrator);
        self
    }

    #[must_use]
    pub fn with_ledger(mut self, ledger: &'a dyn CooldownLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    #[must_use]
    pub fn with_world(mut self, world: &'a dyn WorldOracle) -> Self {
        self.world = Some(world);
        self
    }

    #[must_use]
    pub fn with_manual(mut self, manual: &'a ManualEffects) -> Self {
        self.manual = Some(manual);
        self
    }

    pub fn config(&self) -> &'a RulesConfig {
        self.config
    }

    /// Returns the SpellOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SpellsNotAvailable` if no registry was provided.
    pub fn spells(&self) -> Result<&'a dyn SpellOracle, OracleError> {
        self.spells.ok_or(OracleError::SpellsNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a dyn RngOracle, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Roll stream number `stream` for `actor` at `now`.
    ///
    /// Callers take `stream` from [`ActorTable::next_roll_stream`] so no two
    /// operations share rolls.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    ///
    /// [`ActorTable::next_roll_stream`]: crate::state::ActorTable::next_roll_stream
    pub fn dice(&self, now: Tick, actor: ActorId, stream: u32) -> Result<Dice<'a>, OracleError> {
        Ok(Dice::new(self.rng()?, self.config.game_seed, now.0, actor.0).with_stream(stream))
    }

    pub fn ledger(&self) -> Option<&'a dyn CooldownLedger> {
        self.ledger
    }

    pub fn world(&self) -> Option<&'a dyn WorldOracle> {
        self.world
    }

    pub fn manual(&self) -> Option<&'a ManualEffects> {
        self.manual
    }

    /// Forwards to the narrator, if one is attached.
    pub fn narrate(&self, event: Narration) {
        if let Some(narrator) = self.narrator {
            narrator.narrate(event);
        }
    }
}

impl std::fmt::Debug for RulesEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesEnv")
            .field("config", self.config)
            .field("spells", &self.spells.is_some())
            .field("rng", &self.rng.is_some())
            .field("narrator", &self.narrator.is_some())
            .field("ledger", &self.ledger.is_some())
            .field("world", &self.world.is_some())
            .field("manual", &self.manual.is_some())
            .finish()
    }
}
