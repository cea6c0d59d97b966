//! Narrator implementations used by the runtime.
//!
//! The worker attaches a [`FanoutNarrator`] that forwards every event to a
//! [`TracingNarrator`] and a [`BusNarrator`], plus any sinks the builder adds.

use std::sync::Arc;

use mud_core::{Narration, Narrator};
use tracing::info;

use crate::events::{Event, EventBus};

/// Logs every narration event under the `narration` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNarrator;

impl Narrator for TracingNarrator {
    fn narrate(&self, event: Narration) {
        match &event {
            Narration::Rejected { actor, message } => {
                info!(target: "narration", actor = %actor, text = *message, "rejected");
            }
            Narration::CastInterrupted {
                caster,
                spell,
                reason,
            } => {
                info!(
                    target: "narration",
                    caster = %caster,
                    spell = %spell,
                    reason = %reason,
                    text = reason.message(),
                    "cast interrupted"
                );
            }
            Narration::WoreOff { actor, spell } => {
                info!(target: "narration", actor = %actor, spell = %spell, "wore off");
            }
            other => info!(target: "narration", event = ?other),
        }
    }
}

/// Publishes narration on [`crate::Topic::Narration`].
#[derive(Clone)]
pub struct BusNarrator {
    bus: EventBus,
}

impl BusNarrator {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl Narrator for BusNarrator {
    fn narrate(&self, event: Narration) {
        self.bus.publish(Event::Narration(event));
    }
}

/// Forwards each event to every sink, in insertion order.
#[derive(Clone, Default)]
pub struct FanoutNarrator {
    sinks: Vec<Arc<dyn Narrator>>,
}

impl FanoutNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, sink: Arc<dyn Narrator>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Arc<dyn Narrator>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Narrator for FanoutNarrator {
    fn narrate(&self, event: Narration) {
        let Some((last, rest)) = self.sinks.split_last() else {
            return;
        };
        for sink in rest {
            sink.narrate(event.clone());
        }
        last.narrate(event);
    }
}
