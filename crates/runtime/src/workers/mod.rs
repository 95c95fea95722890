//! Worker tasks that back the runtime.
//!
//! The simulation worker owns the authoritative session and is the only
//! place it is mutated once the runtime is running.

mod simulation;

pub use simulation::{Command, SimulationHandle, SimulationWorker};
