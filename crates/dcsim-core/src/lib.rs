//! A compact discrete-event simulation kernel.
//!
//! The kernel owns the virtual clock, the event queue and a seeded
//! pseudo-random stream. Simulation logic lives in components which are
//! registered as [`EventHandler`]s and talk to the kernel through their
//! [`SimulationContext`]. All components run on a single logical task:
//! event deliveries are the only interleaving points.

pub mod context;
pub mod event;
pub mod handler;
pub mod log;
pub mod simulation;
mod state;

pub use context::SimulationContext;
pub use event::{Event, EventData, EventId};
pub use handler::EventHandler;
pub use simulation::Simulation;

/// Identifier of a simulation component.
pub type Id = u32;

/// Tolerance used for simulation time comparisons.
pub const EPSILON: f64 = 1e-12;
