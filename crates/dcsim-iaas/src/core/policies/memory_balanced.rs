//! Memory Balanced policy.

use dcsim_core::Id;

use crate::core::policy::AllocationPolicy;
use crate::core::pool::ResourcePool;
use crate::core::server::Server;

/// Uses the suitable host with the most available memory.
#[derive(Default)]
pub struct MemoryBalanced;

impl MemoryBalanced {
    pub fn new() -> Self {
        Default::default()
    }
}

impl AllocationPolicy for MemoryBalanced {
    fn select_host(&self, server: &Server, pool: &ResourcePool) -> Option<Id> {
        let mut result: Option<Id> = None;
        let mut max_available_memory: i64 = i64::MIN;

        for view in pool.available_hosts() {
            if view.fits(&server.flavor) && view.available_memory > max_available_memory {
                max_available_memory = view.available_memory;
                result = Some(view.host_id);
            }
        }
        result
    }
}
