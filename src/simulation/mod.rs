//! Simulation layer - the tick coordinator, its command queue, and events

pub mod commands;
pub mod events;
pub mod tick;

pub use commands::Command;
pub use events::{RejectReason, SimulationEvent};
pub use tick::run_tick;
