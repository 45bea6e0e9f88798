//! VM provisioning and scheduling on top of the dcsim event kernel.
//!
//! Clients submit VM launch requests to a provisioning service which keeps
//! them in a FIFO queue and drains it in scheduling cycles aligned to fixed
//! quantum boundaries of the simulation clock. Placement decisions are made
//! by a pluggable allocation policy, capacity is reserved speculatively at
//! decision time and rolled back if the asynchronous spawn on the selected
//! host fails.

pub mod core;
pub mod custom_component;
pub mod simulation;
