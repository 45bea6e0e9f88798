//! Active Balanced policy.

use dcsim_core::Id;

use crate::core::policy::AllocationPolicy;
use crate::core::pool::ResourcePool;
use crate::core::server::Server;

/// Uses the suitable host with the least number of active servers.
#[derive(Default)]
pub struct ActiveBalanced;

impl ActiveBalanced {
    pub fn new() -> Self {
        Default::default()
    }
}

impl AllocationPolicy for ActiveBalanced {
    fn select_host(&self, server: &Server, pool: &ResourcePool) -> Option<Id> {
        let mut result: Option<Id> = None;
        let mut min_active_servers: u32 = u32::MAX;

        for view in pool.available_hosts() {
            if view.fits(&server.flavor) && view.active_servers < min_active_servers {
                min_active_servers = view.active_servers;
                result = Some(view.host_id);
            }
        }
        result
    }
}
