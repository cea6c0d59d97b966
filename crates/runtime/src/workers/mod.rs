//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the actor table and the clock and executes
//! every command against them.

mod simulation;

pub(crate) use simulation::{Collaborators, Command, SimulationWorker};
