//! Service counters.

use serde::Serialize;

/// Counters maintained by the provisioning service.
///
/// `submitted_vms`, `finished_vms` and `unscheduled_vms` only grow;
/// `queued_vms` and `running_vms` go down as VMs move through the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ServiceCounters {
    pub submitted_vms: u64,
    pub queued_vms: u64,
    pub running_vms: u64,
    pub finished_vms: u64,
    pub unscheduled_vms: u64,
}

impl ServiceCounters {
    /// Checks the counter identity which must hold at every observation
    /// boundary: every submitted VM is in exactly one of the four buckets.
    pub fn identity_holds(&self) -> bool {
        self.submitted_vms == self.running_vms + self.finished_vms + self.queued_vms + self.unscheduled_vms
    }
}
