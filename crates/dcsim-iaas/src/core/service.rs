//! The provisioning service: launch queue, quantum-aligned scheduler and
//! host listener.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use sugars::{rc, refcell};

use dcsim_core::context::SimulationContext;
use dcsim_core::dispatch;
use dcsim_core::event::{Event, EventData, EventId};
use dcsim_core::handler::EventHandler;
use dcsim_core::Id;

use crate::core::client::ServiceClient;
use crate::core::common::{uid_str, Flavor, ServerUid};
use crate::core::config::SimulationConfig;
use crate::core::error::{ProvisioningError, SpawnFailureReason};
use crate::core::events::host::{HostStateChanged, ServerStateChanged, SpawnServerFailed, SpawnServerRequest};
use crate::core::events::scheduler::ScheduleCycle;
use crate::core::events::service::{
    HypervisorAvailable, HypervisorUnavailable, MetricsAvailable, VmScheduled, VmStopped, VmSubmission,
    VmSubmissionInvalid,
};
use crate::core::host::{HostState, VirtHost};
use crate::core::logger::Logger;
use crate::core::metrics::ServiceCounters;
use crate::core::policy::AllocationPolicy;
use crate::core::pool::ResourcePool;
use crate::core::server::{Server, ServerState, VmImage};

/// One-shot callback resolving a client's pending launch with a usable
/// server handle.
///
/// Invoked from the scheduling cycle, so it must not call back into the
/// service. A cancelled completion is dropped without being invoked.
pub type LaunchCompletion = Box<dyn FnOnce(Rc<RefCell<Server>>)>;

struct LaunchRequest {
    server: Rc<RefCell<Server>>,
    completion: Option<LaunchCompletion>,
}

/// Accepts VM launch requests, keeps them in a FIFO queue and drains the
/// queue in scheduling cycles aligned to multiples of the scheduling
/// quantum.
///
/// For every placement the service reserves capacity on its host view
/// before the asynchronous spawn completes, so later decisions of the same
/// cycle cannot race against the same free capacity; if the spawn fails the
/// reservation is rolled back. The service also listens to host up/down and
/// VM lifecycle transitions and re-triggers scheduling cycles on every
/// change which may unblock the queue head.
pub struct ProvisioningService {
    hosts: HashMap<Id, Rc<RefCell<VirtHost>>>,
    pool: ResourcePool,
    queue: VecDeque<LaunchRequest>,
    servers: HashMap<ServerUid, Rc<RefCell<Server>>>,
    active_servers: HashMap<ServerUid, Id>,
    pending_spawns: HashMap<ServerUid, Id>,
    counters: ServiceCounters,
    subscribers: Vec<Id>,
    cycle_timer: Option<EventId>,
    closed: bool,
    policy: Box<dyn AllocationPolicy>,
    logger: Rc<RefCell<Box<dyn Logger>>>,
    ctx: SimulationContext,
    config: Rc<SimulationConfig>,
}

impl ProvisioningService {
    pub fn new(
        policy: Box<dyn AllocationPolicy>,
        logger: Rc<RefCell<Box<dyn Logger>>>,
        ctx: SimulationContext,
        config: Rc<SimulationConfig>,
    ) -> Self {
        Self {
            hosts: HashMap::new(),
            pool: ResourcePool::new(),
            queue: VecDeque::new(),
            servers: HashMap::new(),
            active_servers: HashMap::new(),
            pending_spawns: HashMap::new(),
            counters: ServiceCounters::default(),
            subscribers: Vec::new(),
            cycle_timer: None,
            closed: false,
            policy,
            logger,
            ctx,
            config,
        }
    }

    /// Returns the component id of the service.
    pub fn id(&self) -> Id {
        self.ctx.id()
    }

    /// Creates a client handle bound to this service.
    pub fn new_client(service: &Rc<RefCell<ProvisioningService>>) -> ServiceClient {
        ServiceClient::new(service.clone())
    }

    pub fn counters(&self) -> ServiceCounters {
        self.counters
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Returns the handle of the server with the given uid.
    pub fn server(&self, server_uid: ServerUid) -> Option<Rc<RefCell<Server>>> {
        self.servers.get(&server_uid).cloned()
    }

    /// Returns the number of requests currently waiting in the queue.
    pub fn queued_request_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Registers a subscriber component for the service event stream
    /// (metrics, hypervisor availability, VM lifecycle traces).
    pub fn subscribe(&mut self, subscriber: Id) {
        if !self.subscribers.contains(&subscriber) {
            self.subscribers.push(subscriber);
        }
    }

    /// Accepts a launch request: creates the server, queues the request and
    /// asks for a scheduling cycle. Normally invoked through
    /// [`ServiceClient::new_server`].
    pub fn new_server(
        &mut self,
        name: &str,
        image: VmImage,
        flavor: Flavor,
        completion: LaunchCompletion,
    ) -> Result<Rc<RefCell<Server>>, ProvisioningError> {
        if self.closed {
            return Err(ProvisioningError::ClientClosed);
        }
        let server_uid = self.ctx.rand_u128();
        let server = rc!(refcell!(Server::new(server_uid, name, flavor, image)));
        self.servers.insert(server_uid, server.clone());
        self.queue.push_back(LaunchRequest {
            server: server.clone(),
            completion: Some(completion),
        });
        self.counters.submitted_vms += 1;
        self.counters.queued_vms += 1;
        self.logger.borrow_mut().log_debug(
            &self.ctx,
            format!("server {} ({}) submitted", name, uid_str(server_uid)),
        );
        self.publish(VmSubmission {
            name: name.to_string(),
            flavor,
        });
        self.publish_metrics();
        self.request_cycle();
        Ok(server)
    }

    /// Closes the service: cancels all pending launch requests, disarms the
    /// cycle timer and rejects future submissions. Spawns already past the
    /// resolve point are left to complete on their hosts.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(timer) = self.cycle_timer.take() {
            self.ctx.cancel_event(timer);
        }
        let cancelled = self.queue.len();
        self.queue.clear();
        self.logger.borrow_mut().log_info(
            &self.ctx,
            format!("service closed, cancelled {} pending requests", cancelled),
        );
    }

    /// Registers a host. Idempotent: adding an already-registered host
    /// changes nothing.
    pub fn add_host(&mut self, host: Rc<RefCell<VirtHost>>) {
        let (host_id, model, state) = {
            let host = host.borrow();
            (host.id, host.model(), host.state())
        };
        if !self.pool.add_host(host_id, &model) {
            return;
        }
        self.hosts.insert(host_id, host.clone());
        if state == HostState::Up {
            self.pool.set_available(host_id, true);
        }
        host.borrow_mut().add_listener(self.ctx.id());
        self.logger.borrow_mut().log_info(
            &self.ctx,
            format!(
                "registered host {} ({} cores, {} memory, {})",
                self.ctx.lookup_name(host_id),
                model.cpu_count,
                model.memory_size,
                state
            ),
        );
    }

    /// Stops listening to the host. The host view, the servers placed on it
    /// and the counters are left untouched.
    pub fn remove_host(&mut self, host: &Rc<RefCell<VirtHost>>) {
        host.borrow_mut().remove_listener(self.ctx.id());
    }

    /// Arms the cycle timer for the next quantum boundary, unless a timer
    /// is already armed. Firing times are always multiples of the quantum.
    fn request_cycle(&mut self) {
        if self.closed || self.cycle_timer.is_some() {
            return;
        }
        let quantum = self.config.scheduling_quantum;
        let delay = quantum - self.ctx.time() % quantum;
        self.cycle_timer = Some(self.ctx.emit_self(ScheduleCycle {}, delay));
    }

    fn on_schedule_cycle(&mut self) {
        self.cycle_timer = None;
        loop {
            let server = match self.queue.front() {
                Some(request) => request.server.clone(),
                None => break,
            };
            let (server_uid, name, flavor) = {
                let server = server.borrow();
                (server.uid, server.name.clone(), server.flavor)
            };
            // the policy's choice is advisory, re-check against the host itself
            let candidate = self
                .policy
                .select_host(&server.borrow(), &self.pool)
                .filter(|host_id| match self.hosts.get(host_id) {
                    Some(host) => host.borrow().can_fit(&server.borrow()),
                    None => false,
                });
            match candidate {
                Some(host_id) => {
                    let request = self.queue.pop_front().unwrap();
                    self.pool.allocate(host_id, server_uid, &flavor);
                    self.pending_spawns.insert(server_uid, host_id);
                    self.logger.borrow_mut().log_debug(
                        &self.ctx,
                        format!(
                            "assigned server {} ({}) to host {}",
                            name,
                            uid_str(server_uid),
                            self.ctx.lookup_name(host_id)
                        ),
                    );
                    if let Some(completion) = request.completion {
                        completion(request.server.clone());
                    }
                    let image = server.borrow().image.clone();
                    self.ctx.emit(
                        SpawnServerRequest {
                            server_uid,
                            flavor,
                            image,
                        },
                        host_id,
                        self.config.message_delay,
                    );
                }
                None => {
                    if self.pool.fits_anywhere(&flavor) {
                        // head-of-line blocking: keep arrival order, retry
                        // at the next cycle trigger
                        break;
                    }
                    let request = self.queue.pop_front().unwrap();
                    // the pending completion is abandoned, the client is
                    // never resolved
                    drop(request.completion);
                    self.counters.queued_vms -= 1;
                    self.counters.unscheduled_vms += 1;
                    self.logger.borrow_mut().log_warn(
                        &self.ctx,
                        format!(
                            "server {} ({}) does not fit any known host model, rejected",
                            name,
                            uid_str(server_uid)
                        ),
                    );
                    self.publish(VmSubmissionInvalid { name });
                    self.publish_metrics();
                }
            }
        }
    }

    fn on_host_state_changed(&mut self, host_id: Id, state: HostState) {
        if !self.pool.contains(host_id) {
            self.logger.borrow_mut().log_error(
                &self.ctx,
                format!("state change from unknown host {}", host_id),
            );
            return;
        }
        self.logger.borrow_mut().log_debug(
            &self.ctx,
            format!("host {} is {}", self.ctx.lookup_name(host_id), state),
        );
        match state {
            HostState::Up => {
                self.pool.set_available(host_id, true);
                self.publish(HypervisorAvailable { host_id });
            }
            HostState::Down => {
                self.pool.set_available(host_id, false);
                self.publish(HypervisorUnavailable { host_id });
            }
        }
        if !self.queue.is_empty() {
            self.request_cycle();
        }
    }

    fn on_server_state_changed(&mut self, server_uid: ServerUid, state: ServerState) {
        let server = match self.servers.get(&server_uid) {
            Some(server) => server.clone(),
            None => {
                self.logger.borrow_mut().log_error(
                    &self.ctx,
                    format!("state change for unknown server {}", uid_str(server_uid)),
                );
                return;
            }
        };
        let name = server.borrow().name.clone();
        let watchers = {
            let mut server = server.borrow_mut();
            server.set_state(state);
            server.watchers()
        };
        for watcher in watchers {
            watcher.borrow_mut().on_server_state_changed(server_uid, state);
        }
        match state {
            ServerState::Active => {
                match self.pending_spawns.remove(&server_uid) {
                    Some(host_id) => {
                        self.active_servers.insert(server_uid, host_id);
                        self.counters.running_vms += 1;
                        self.counters.queued_vms -= 1;
                        self.logger.borrow_mut().log_debug(
                            &self.ctx,
                            format!(
                                "server {} ({}) is running on host {}",
                                name,
                                uid_str(server_uid),
                                self.ctx.lookup_name(host_id)
                            ),
                        );
                        self.publish(VmScheduled { name });
                        self.publish_metrics();
                    }
                    None => {
                        self.logger.borrow_mut().log_error(
                            &self.ctx,
                            format!("server {} became active without a pending spawn", uid_str(server_uid)),
                        );
                    }
                }
            }
            ServerState::Shutoff => {
                let host_id = match self.active_servers.remove(&server_uid) {
                    Some(host_id) => host_id,
                    None => {
                        self.logger.borrow_mut().log_error(
                            &self.ctx,
                            format!("terminated server {} is not placed on any host", uid_str(server_uid)),
                        );
                        return;
                    }
                };
                self.counters.running_vms -= 1;
                self.counters.finished_vms += 1;
                let flavor = server.borrow().flavor;
                self.pool.release(host_id, server_uid, &flavor);
                self.logger.borrow_mut().log_debug(
                    &self.ctx,
                    format!("server {} ({}) stopped", name, uid_str(server_uid)),
                );
                self.publish(VmStopped { name });
                self.publish_metrics();
                if !self.queue.is_empty() {
                    self.request_cycle();
                }
            }
            ServerState::Build | ServerState::Error => {}
        }
    }

    /// Rolls back the speculative reservation of a failed spawn. The
    /// request is not re-enqueued: its completion has already been resolved
    /// and the client cannot observe the failure.
    fn on_spawn_failed(&mut self, server_uid: ServerUid, host_id: Id, reason: SpawnFailureReason) {
        self.pending_spawns.remove(&server_uid);
        let flavor = match self.servers.get(&server_uid) {
            Some(server) => server.borrow().flavor,
            None => {
                self.logger.borrow_mut().log_error(
                    &self.ctx,
                    format!("spawn failure for unknown server {}", uid_str(server_uid)),
                );
                return;
            }
        };
        if self.pool.release(host_id, server_uid, &flavor) {
            self.logger.borrow_mut().log_error(
                &self.ctx,
                format!(
                    "failed to spawn server {} on host {}: {}",
                    uid_str(server_uid),
                    self.ctx.lookup_name(host_id),
                    reason
                ),
            );
        } else {
            self.logger.borrow_mut().log_error(
                &self.ctx,
                format!(
                    "spawn failure for server {} without a reservation on host {}",
                    uid_str(server_uid),
                    self.ctx.lookup_name(host_id)
                ),
            );
        }
    }

    fn publish<T: EventData + Clone>(&self, event: T) {
        for subscriber in &self.subscribers {
            self.ctx.emit_now(event.clone(), *subscriber);
        }
    }

    fn publish_metrics(&self) {
        self.publish(MetricsAvailable {
            host_count: self.pool.host_count() as u32,
            available_host_count: self.pool.available_count() as u32,
            counters: self.counters,
        });
    }
}

impl EventHandler for ProvisioningService {
    fn on(&mut self, event: Event) {
        dispatch!(match event {
            ScheduleCycle {} => {
                self.on_schedule_cycle();
            }
            HostStateChanged { host_id, state } => {
                self.on_host_state_changed(host_id, state);
            }
            ServerStateChanged { server_uid, state } => {
                self.on_server_state_changed(server_uid, state);
            }
            SpawnServerFailed { server_uid, host_id, reason } => {
                self.on_spawn_failed(server_uid, host_id, reason);
            }
        })
    }
}
