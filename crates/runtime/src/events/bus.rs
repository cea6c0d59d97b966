//! Topic-based event bus implementation.

use mud_core::{Narration, TickReport};
use tokio::sync::broadcast;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    /// Everything the rules core narrates
    Narration,
    /// One report per scheduler tick that changed something
    Tick,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone)]
pub enum Event {
    Narration(Narration),
    Tick(TickReport),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Narration(_) => Topic::Narration,
            Event::Tick(_) => Topic::Tick,
        }
    }
}

/// Topic-based event bus
///
/// Both topic channels exist for the lifetime of the bus; publishing with no
/// subscribers drops the event.
#[derive(Clone)]
pub struct EventBus {
    narration: broadcast::Sender<Event>,
    tick: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            narration: broadcast::channel(capacity).0,
            tick: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Narration => &self.narration,
            Topic::Tick => &self.tick,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
