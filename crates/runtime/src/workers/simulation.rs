//! Simulation worker that owns the authoritative [`ActorTable`].
//!
//! Receives commands from [`crate::RuntimeHandle`], runs them through the
//! rules core, and publishes tick reports to the [`EventBus`]. Narration
//! flows out through the attached narrator as the core produces it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use mud_core::{
    Actor, ActorId, ActorTable, CastOutcome, CastRequest, Item, ManualEffects, Narrator,
    RngOracle, RulesConfig, RulesEnv, Scheduler, SpellId, SpellRegistry, Tick, TickReport,
    WearSlot, WorldOracle, abort_cast, begin_cast,
};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus};
use crate::ledger::InMemoryLedger;

/// Commands that can be sent to the simulation worker
pub(crate) enum Command {
    /// Load an actor into the table, recomputing its attributes.
    SpawnActor {
        actor: Box<Actor>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Remove an actor, returning its final state.
    DespawnActor {
        actor: ActorId,
        reply: oneshot::Sender<Result<Actor>>,
    },
    /// Snapshot one actor (read-only).
    QueryActor {
        actor: ActorId,
        reply: oneshot::Sender<Option<Actor>>,
    },
    BeginCast {
        request: CastRequest,
        reply: oneshot::Sender<Result<CastOutcome>>,
    },
    AbortCast {
        caster: ActorId,
        reply: oneshot::Sender<Result<SpellId>>,
    },
    Equip {
        actor: ActorId,
        item: Arc<Item>,
        slot: WearSlot,
        reply: oneshot::Sender<Result<()>>,
    },
    Unequip {
        actor: ActorId,
        slot: WearSlot,
        reply: oneshot::Sender<Result<Arc<Item>>>,
    },
    /// Advance the clock by one tick and run the scheduler.
    Tick {
        reply: oneshot::Sender<TickReport>,
    },
    /// Current simulated time.
    Now { reply: oneshot::Sender<Tick> },
}

/// Everything [`RulesEnv`] borrows, owned by the worker.
pub(crate) struct Collaborators {
    pub config: RulesConfig,
    pub spells: Arc<SpellRegistry>,
    pub rng: Arc<dyn RngOracle>,
    pub narrator: Arc<dyn Narrator>,
    pub ledger: Arc<InMemoryLedger>,
    pub world: Option<Arc<dyn WorldOracle>>,
    pub manual: ManualEffects,
}

impl Collaborators {
    fn env(&self) -> RulesEnv<'_> {
        let env = RulesEnv::with_all(&self.config, self.spells.as_ref(), self.rng.as_ref())
            .with_narrator(self.narrator.as_ref())
            .with_ledger(self.ledger.as_ref())
            .with_manual(&self.manual);
        match &self.world {
            Some(world) => env.with_world(world.as_ref()),
            None => env,
        }
    }
}

/// Background task that processes rules commands.
///
/// The worker is the single tick source: every mutation of an actor happens
/// on this task, one command at a time.
pub(crate) struct SimulationWorker {
    actors: ActorTable,
    collab: Collaborators,
    now: Tick,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    tick_period: Option<Duration>,
}

impl SimulationWorker {
    pub(crate) fn new(
        actors: ActorTable,
        collab: Collaborators,
        start: Tick,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        tick_period: Option<Duration>,
    ) -> Self {
        info!(
            target: "runtime::worker",
            actors = actors.len(),
            spells = collab.spells.len(),
            tick = start.0,
            "SimulationWorker initialized"
        );

        Self {
            actors,
            collab,
            now: start,
            command_rx,
            event_bus,
            tick_period,
        }
    }

    /// Main worker loop.
    ///
    /// Exits once every [`crate::RuntimeHandle`] has been dropped.
    pub(crate) async fn run(mut self) {
        let Some(period) = self.tick_period else {
            while let Some(cmd) = self.command_rx.recv().await {
                self.handle_command(cmd);
            }
            return;
        };

        let mut clock = time::interval(period);
        clock.set_missed_tick_behavior(MissedTickBehavior::Burst);
        // The first interval tick completes immediately.
        clock.tick().await;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = clock.tick() => {
                    self.advance_clock();
                }
            }
        }
        debug!(target: "runtime::worker", tick = self.now.0, "worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::SpawnActor { actor, reply } => {
                let result = self.spawn(*actor);
                if reply.send(result).is_err() {
                    debug!("SpawnActor reply channel closed (caller dropped)");
                }
            }
            Command::DespawnActor { actor, reply } => {
                let result = self.actors.remove(actor).ok_or(RuntimeError::UnknownActor(actor));
                if reply.send(result).is_err() {
                    debug!("DespawnActor reply channel closed (caller dropped)");
                }
            }
            Command::QueryActor { actor, reply } => {
                if reply.send(self.actors.get(actor).cloned()).is_err() {
                    debug!("QueryActor reply channel closed (caller dropped)");
                }
            }
            Command::BeginCast { request, reply } => {
                let result = begin_cast(self.collab.env(), &mut self.actors, request, self.now)
                    .map_err(RuntimeError::from);
                if reply.send(result).is_err() {
                    debug!("BeginCast reply channel closed (caller dropped)");
                }
            }
            Command::AbortCast { caster, reply } => {
                let result = abort_cast(self.collab.env(), &mut self.actors, caster)
                    .map_err(RuntimeError::from);
                if reply.send(result).is_err() {
                    debug!("AbortCast reply channel closed (caller dropped)");
                }
            }
            Command::Equip {
                actor,
                item,
                slot,
                reply,
            } => {
                let result = self.with_actor(actor, |a| a.equip(item, slot).map_err(Into::into));
                if reply.send(result).is_err() {
                    debug!("Equip reply channel closed (caller dropped)");
                }
            }
            Command::Unequip { actor, slot, reply } => {
                let result = self.with_actor(actor, |a| a.unequip(slot).map_err(Into::into));
                if reply.send(result).is_err() {
                    debug!("Unequip reply channel closed (caller dropped)");
                }
            }
            Command::Tick { reply } => {
                let report = self.advance_clock();
                if reply.send(report).is_err() {
                    debug!("Tick reply channel closed (caller dropped)");
                }
            }
            Command::Now { reply } => {
                if reply.send(self.now).is_err() {
                    debug!("Now reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn spawn(&mut self, mut actor: Actor) -> Result<()> {
        if self.actors.get(actor.id).is_some() {
            return Err(RuntimeError::DuplicateActor(actor.id));
        }
        actor.restore();
        debug!(target: "runtime::worker", actor = %actor.id, name = %actor.name, "actor spawned");
        self.actors.insert(actor);
        Ok(())
    }

    fn with_actor<T>(
        &mut self,
        id: ActorId,
        edit: impl FnOnce(&mut Actor) -> Result<T>,
    ) -> Result<T> {
        let actor = self.actors.get_mut(id).ok_or(RuntimeError::UnknownActor(id))?;
        edit(actor)
    }

    fn advance_clock(&mut self) -> TickReport {
        self.now = self.now + 1;
        let report = Scheduler::tick(self.collab.env(), &mut self.actors, self.now);
        if !report.actors.is_empty() || report.pulse {
            self.event_bus.publish(Event::Tick(report.clone()));
        }
        report
    }
}
