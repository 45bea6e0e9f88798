//! Per-host bookkeeping maintained by the provisioning service.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};

use dcsim_core::Id;

use crate::core::common::{Flavor, ServerUid};
use crate::core::host::HostModel;

/// Mutable accounting for one registered host.
///
/// The view reflects the service's reservations, not the host's actual
/// state: capacity is reserved here speculatively at placement decision
/// time and released when the spawn fails or the server reaches shutoff.
/// `provisioned_cores` may exceed `cpu_total` if the allocation policy
/// decides to oversubscribe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostView {
    pub host_id: Id,
    pub cpu_total: u32,
    pub memory_total: u64,
    pub active_servers: u32,
    pub provisioned_cores: u32,
    pub available_memory: i64,
    placed: BTreeSet<ServerUid>,
}

impl HostView {
    fn new(host_id: Id, model: &HostModel) -> Self {
        Self {
            host_id,
            cpu_total: model.cpu_count,
            memory_total: model.memory_size,
            active_servers: 0,
            provisioned_cores: 0,
            available_memory: model.memory_size as i64,
            placed: BTreeSet::new(),
        }
    }

    /// Returns the number of cores not yet provisioned (negative when the
    /// host is oversubscribed).
    pub fn unprovisioned_cores(&self) -> i64 {
        self.cpu_total as i64 - self.provisioned_cores as i64
    }

    /// Checks whether the flavor fits into the unreserved capacity.
    pub fn fits(&self, flavor: &Flavor) -> bool {
        self.unprovisioned_cores() >= flavor.cpu_count as i64
            && self.available_memory >= flavor.memory_size as i64
    }

    // Each placed server contributes to the counters exactly once,
    // guarded by the placed set.
    fn allocate(&mut self, server_uid: ServerUid, flavor: &Flavor) {
        if !self.placed.insert(server_uid) {
            return;
        }
        self.active_servers += 1;
        self.provisioned_cores += flavor.cpu_count;
        self.available_memory -= flavor.memory_size as i64;
    }

    fn release(&mut self, server_uid: ServerUid, flavor: &Flavor) -> bool {
        if !self.placed.remove(&server_uid) {
            return false;
        }
        self.active_servers -= 1;
        self.provisioned_cores -= flavor.cpu_count;
        self.available_memory += flavor.memory_size as i64;
        true
    }
}

/// Views of all registered hosts along with the availability set and the
/// maximum host model observed so far.
///
/// Both the view map and the availability set preserve insertion order, so
/// policies iterating over available hosts see them in registration order.
#[derive(Default)]
pub struct ResourcePool {
    views: IndexMap<Id, HostView>,
    available: IndexSet<Id>,
    max_cores: u32,
    max_memory: u64,
}

impl ResourcePool {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a host to the pool. Returns `false` if the host was already
    /// registered (the existing view is kept untouched).
    pub fn add_host(&mut self, host_id: Id, model: &HostModel) -> bool {
        if self.views.contains_key(&host_id) {
            return false;
        }
        self.views.insert(host_id, HostView::new(host_id, model));
        self.max_cores = self.max_cores.max(model.cpu_count);
        self.max_memory = self.max_memory.max(model.memory_size);
        true
    }

    pub fn contains(&self, host_id: Id) -> bool {
        self.views.contains_key(&host_id)
    }

    /// Returns the view of the specified host.
    ///
    /// Panics if the host is not registered.
    pub fn view(&self, host_id: Id) -> &HostView {
        &self.views[&host_id]
    }

    pub fn host_count(&self) -> usize {
        self.views.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn is_available(&self, host_id: Id) -> bool {
        self.available.contains(&host_id)
    }

    /// Inserts the host into or removes it from the availability set.
    pub fn set_available(&mut self, host_id: Id, available: bool) {
        if !self.views.contains_key(&host_id) {
            return;
        }
        if available {
            self.available.insert(host_id);
        } else {
            self.available.shift_remove(&host_id);
        }
    }

    /// Iterates over the views of available hosts in insertion order.
    pub fn available_hosts(&self) -> impl Iterator<Item = &HostView> {
        self.available.iter().map(move |host_id| &self.views[host_id])
    }

    /// Applies a speculative reservation for the server on the host.
    pub fn allocate(&mut self, host_id: Id, server_uid: ServerUid, flavor: &Flavor) {
        if let Some(view) = self.views.get_mut(&host_id) {
            view.allocate(server_uid, flavor);
        }
    }

    /// Releases the reservation held by the server on the host. Returns
    /// `false` if no such reservation exists.
    pub fn release(&mut self, host_id: Id, server_uid: ServerUid, flavor: &Flavor) -> bool {
        match self.views.get_mut(&host_id) {
            Some(view) => view.release(server_uid, flavor),
            None => false,
        }
    }

    /// Core count of the largest host model ever registered.
    pub fn max_cores(&self) -> u32 {
        self.max_cores
    }

    /// Memory size of the largest host model ever registered.
    pub fn max_memory(&self) -> u64 {
        self.max_memory
    }

    /// Checks whether the flavor could fit an empty host of the maximum
    /// model observed so far. Requests failing this check can never be
    /// placed and are rejected permanently.
    pub fn fits_anywhere(&self, flavor: &Flavor) -> bool {
        flavor.cpu_count <= self.max_cores && flavor.memory_size <= self.max_memory
    }
}
