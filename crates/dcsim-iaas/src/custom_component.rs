//! Custom component standard interface.

use dcsim_core::context::SimulationContext;
use dcsim_core::handler::EventHandler;

/// Interface for user-defined simulation components (workload drivers,
/// event stream subscribers etc.) built via
/// [`CloudSimulation::build_custom_component`](crate::simulation::CloudSimulation::build_custom_component).
pub trait CustomComponent: EventHandler {
    /// Creates a new component.
    fn new(ctx: SimulationContext) -> Self
    where
        Self: Sized;
}
