//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! every rules command and for streaming events from specific topics.
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use mud_core::{Actor, ActorId, CastOutcome, CastRequest, Item, SpellId, Tick, TickReport, WearSlot};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Load an actor. Its derived attributes are regenerated on arrival.
    pub async fn spawn_actor(&self, actor: Actor) -> Result<()> {
        self.request(|reply| Command::SpawnActor {
            actor: Box::new(actor),
            reply,
        })
        .await?
    }

    /// Remove an actor and return its final state.
    pub async fn despawn_actor(&self, actor: ActorId) -> Result<Actor> {
        self.request(|reply| Command::DespawnActor { actor, reply })
            .await?
    }

    /// Snapshot an actor, or `None` if it is not loaded.
    pub async fn query_actor(&self, actor: ActorId) -> Result<Option<Actor>> {
        self.request(|reply| Command::QueryActor { actor, reply })
            .await
    }

    /// Start casting. Quickened and zero-time spells resolve immediately.
    pub async fn begin_cast(&self, request: CastRequest) -> Result<CastOutcome> {
        self.request(|reply| Command::BeginCast { request, reply })
            .await?
    }

    /// Cancel the caster's session, returning the abandoned spell.
    pub async fn abort_cast(&self, caster: ActorId) -> Result<SpellId> {
        self.request(|reply| Command::AbortCast { caster, reply })
            .await?
    }

    pub async fn equip(&self, actor: ActorId, item: Arc<Item>, slot: WearSlot) -> Result<()> {
        self.request(|reply| Command::Equip {
            actor,
            item,
            slot,
            reply,
        })
        .await?
    }

    pub async fn unequip(&self, actor: ActorId, slot: WearSlot) -> Result<Arc<Item>> {
        self.request(|reply| Command::Unequip { actor, slot, reply })
            .await?
    }

    /// Advance the simulation by exactly one tick.
    pub async fn tick(&self) -> Result<TickReport> {
        self.request(|reply| Command::Tick { reply }).await
    }

    /// Current simulated time.
    pub async fn now(&self) -> Result<Tick> {
        self.request(|reply| Command::Now { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Narration` - everything the rules core narrates
    /// - `Topic::Tick` - scheduler reports for ticks that changed something
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
