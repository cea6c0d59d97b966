//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for hosts to drive the rules core.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use mud_content::ContentFactory;
use mud_core::{
    Actor, ActorTable, ManualEffects, Narrator, PcgRng, RngOracle, RulesConfig, SpellRegistry,
    Tick, WorldOracle,
};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::ledger::InMemoryLedger;
use crate::narrator::{BusNarrator, FanoutNarrator, TracingNarrator};
use crate::workers::{Collaborators, Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub rules: RulesConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Real time per simulated tick. `None` leaves the clock to explicit
    /// [`RuntimeHandle::tick`] calls.
    pub tick_period: Option<Duration>,
    /// Simulated time the clock starts from.
    pub start_tick: Tick,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            tick_period: None,
            start_tick: Tick::ZERO,
        }
    }
}

/// Main runtime that orchestrates the rules simulation
///
/// Design: Runtime owns the worker and coordinates shutdown.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once this and every cloned handle are dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    spells: Option<SpellRegistry>,
    actors: Vec<Actor>,
    rng: Option<Arc<dyn RngOracle>>,
    narrators: Vec<Arc<dyn Narrator>>,
    world: Option<Arc<dyn WorldOracle>>,
    manual: ManualEffects,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            spells: None,
            actors: Vec::new(),
            rng: None,
            narrators: Vec::new(),
            world: None,
            manual: ManualEffects::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the rules configuration
    pub fn rules(mut self, rules: RulesConfig) -> Self {
        self.config.rules = rules;
        self
    }

    /// Drive the clock from a `tokio` interval of `period` per tick.
    pub fn run_clock(mut self, period: Duration) -> Self {
        self.config.tick_period = Some(period);
        self
    }

    /// Set the spell registry. Defaults to the builtin catalog.
    pub fn spells(mut self, spells: SpellRegistry) -> Self {
        self.spells = Some(spells);
        self
    }

    /// Load rules config and spells from a content directory.
    pub fn content_dir(mut self, dir: impl AsRef<Path>) -> Result<Self> {
        let factory = ContentFactory::new(dir.as_ref());
        self.config.rules = factory.load_config().map_err(RuntimeError::Content)?;
        self.spells = Some(factory.load_spells().map_err(RuntimeError::Content)?);
        Ok(self)
    }

    /// Provide actors present when the worker starts
    pub fn actors(mut self, actors: impl IntoIterator<Item = Actor>) -> Self {
        self.actors.extend(actors);
        self
    }

    /// Replace the seeded dice source
    pub fn rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Add a narration sink next to the tracing and bus narrators
    pub fn narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrators.push(narrator);
        self
    }

    pub fn world(mut self, world: Arc<dyn WorldOracle>) -> Self {
        self.world = Some(world);
        self
    }

    /// Set the table of hand-written spell effects
    pub fn manual_effects(mut self, manual: ManualEffects) -> Self {
        self.manual = manual;
        self
    }

    /// Build the runtime and spawn its worker.
    pub fn build(self) -> Result<Runtime> {
        let spells = match self.spells {
            Some(spells) => spells,
            None => mud_content::SpellLoader::builtin().map_err(RuntimeError::Content)?,
        };

        let mut actors = ActorTable::new();
        for mut actor in self.actors {
            if actors.get(actor.id).is_some() {
                return Err(RuntimeError::DuplicateActor(actor.id));
            }
            actor.restore();
            actors.insert(actor);
        }

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let mut narrator = FanoutNarrator::new()
            .with(Arc::new(TracingNarrator))
            .with(Arc::new(BusNarrator::new(event_bus.clone())));
        for sink in self.narrators {
            narrator.push(sink);
        }

        let collab = Collaborators {
            ledger: Arc::new(InMemoryLedger::from_config(&self.config.rules)),
            config: self.config.rules,
            spells: Arc::new(spells),
            rng: self.rng.unwrap_or_else(|| Arc::new(PcgRng)),
            narrator: Arc::new(narrator),
            world: self.world,
            manual: self.manual,
        };

        let sim_worker = SimulationWorker::new(
            actors,
            collab,
            self.config.start_tick,
            command_rx,
            event_bus,
            self.config.tick_period,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
