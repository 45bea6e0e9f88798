//! First Fit policy.

use dcsim_core::Id;

use crate::core::policy::AllocationPolicy;
use crate::core::pool::ResourcePool;
use crate::core::server::Server;

/// Uses the first available host (in registration order) with enough
/// unprovisioned cores and memory.
#[derive(Default)]
pub struct FirstFit;

impl FirstFit {
    pub fn new() -> Self {
        Default::default()
    }
}

impl AllocationPolicy for FirstFit {
    fn select_host(&self, server: &Server, pool: &ResourcePool) -> Option<Id> {
        pool.available_hosts()
            .find(|view| view.fits(&server.flavor))
            .map(|view| view.host_id)
    }
}
