//! Runtime orchestration for the rules core.
//!
//! This crate wires the deterministic [`mud_core`] rules into a running
//! service: a background worker owns the actor table and the clock, clients
//! talk to it through a cloneable [`RuntimeHandle`], and narration is routed
//! to `tracing` and to topic subscribers.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`narrator`] and [`ledger`] implement the core's collaborator traits
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod ledger;
pub mod narrator;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, Topic};
pub use ledger::InMemoryLedger;
pub use narrator::{BusNarrator, FanoutNarrator, TracingNarrator};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
