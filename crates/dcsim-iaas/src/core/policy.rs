//! Allocation policy interface.

use dcsim_core::Id;

use crate::core::policies::{ActiveBalanced, FirstFit, MemoryBalanced};
use crate::core::pool::ResourcePool;
use crate::core::server::Server;

/// Selects a host for a server among the currently available hosts.
///
/// The policy reads host views (and the host models behind them) but never
/// mutates the pool. Its choice is advisory: the scheduler re-checks the
/// candidate host's own capacity before committing, so a policy may return
/// a host which turns out to be unsuitable.
pub trait AllocationPolicy {
    fn select_host(&self, server: &Server, pool: &ResourcePool) -> Option<Id>;
}

/// Resolves an allocation policy from its config name.
pub fn allocation_policy_resolver(config_str: &str) -> Box<dyn AllocationPolicy> {
    match config_str {
        "FirstFit" => Box::new(FirstFit::new()),
        "ActiveBalanced" => Box::new(ActiveBalanced::new()),
        "MemoryBalanced" => Box::new(MemoryBalanced::new()),
        _ => panic!("can't resolve allocation policy: {}", config_str),
    }
}
