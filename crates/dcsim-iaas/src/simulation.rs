//! The main entry point for simulation configuration and execution.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use sugars::{rc, refcell};

use dcsim_core::context::SimulationContext;
use dcsim_core::simulation::Simulation;
use dcsim_core::Id;

use crate::core::client::ServiceClient;
use crate::core::common::ServerUid;
use crate::core::config::SimulationConfig;
use crate::core::host::{HostModel, VirtHost};
use crate::core::logger::{Logger, StdoutLogger};
use crate::core::metrics::ServiceCounters;
use crate::core::policy::allocation_policy_resolver;
use crate::core::pool::HostView;
use crate::core::server::ServerState;
use crate::core::service::ProvisioningService;
use crate::custom_component::CustomComponent;

/// Represents a simulation, provides methods for its configuration and
/// execution.
///
/// It encapsulates the provisioning service and the simulated hosts and
/// provides convenient access to them for the user.
pub struct CloudSimulation {
    service: Rc<RefCell<ProvisioningService>>,
    hosts: BTreeMap<Id, Rc<RefCell<VirtHost>>>,
    logger: Rc<RefCell<Box<dyn Logger>>>,
    sim: Simulation,
    config: Rc<SimulationConfig>,
}

impl CloudSimulation {
    /// Creates a simulation with the specified config, logging to stdout.
    pub fn new(sim: Simulation, config: SimulationConfig) -> Self {
        Self::with_logger(sim, config, Box::new(StdoutLogger::new()))
    }

    /// Creates a simulation with the specified config and tracer.
    pub fn with_logger(mut sim: Simulation, config: SimulationConfig, logger: Box<dyn Logger>) -> Self {
        let logger: Rc<RefCell<Box<dyn Logger>>> = rc!(refcell!(logger));
        let config = rc!(config);
        let policy = allocation_policy_resolver(&config.allocation_policy);
        let service = rc!(refcell!(ProvisioningService::new(
            policy,
            logger.clone(),
            sim.create_context("provisioning"),
            config.clone(),
        )));
        sim.add_handler("provisioning", service.clone());

        let mut cloud_sim = Self {
            service,
            hosts: BTreeMap::new(),
            logger,
            sim,
            config,
        };

        // Add hosts from config
        for host_config in cloud_sim.config.hosts.clone() {
            let count = host_config.count.unwrap_or(1);
            if count == 1 {
                let name = host_config.name.clone().unwrap();
                cloud_sim.add_host(&name, host_config.cpus, host_config.memory);
            } else {
                let prefix = host_config.name_prefix.clone().unwrap();
                for i in 0..count {
                    let name = format!("{}{}", prefix, i + 1);
                    cloud_sim.add_host(&name, host_config.cpus, host_config.memory);
                }
            }
        }

        cloud_sim
    }

    /// Creates a new host with the specified name and resource capacity,
    /// registers it in the provisioning service and returns the host id.
    pub fn add_host(&mut self, name: &str, cpu_count: u32, memory_size: u64) -> Id {
        let model = HostModel {
            cpu_count,
            memory_size,
        };
        let host = rc!(refcell!(VirtHost::new(
            model,
            self.sim.create_context(name),
            self.config.clone(),
        )));
        let id = self.sim.add_handler(name, host.clone());
        self.hosts.insert(id, host.clone());
        self.service.borrow_mut().add_host(host);
        id
    }

    /// Creates a client handle bound to the provisioning service.
    pub fn new_client(&self) -> ServiceClient {
        ProvisioningService::new_client(&self.service)
    }

    /// Creates a custom component and adds it to the simulation.
    pub fn build_custom_component<Component: 'static + CustomComponent>(
        &mut self,
        name: &str,
    ) -> Rc<RefCell<Component>> {
        let component = rc!(refcell!(Component::new(self.sim.create_context(name))));
        self.sim.add_handler(name, component.clone());
        component
    }

    /// Subscribes a component to the service event stream.
    pub fn subscribe(&mut self, subscriber: Id) {
        self.service.borrow_mut().subscribe(subscriber);
    }

    /// Returns the reference to the provisioning service.
    pub fn service(&self) -> Rc<RefCell<ProvisioningService>> {
        self.service.clone()
    }

    /// Returns the reference to the host with the given id.
    pub fn host(&self, host_id: Id) -> Rc<RefCell<VirtHost>> {
        self.hosts.get(&host_id).unwrap().clone()
    }

    /// Returns a copy of the service's bookkeeping view of the given host.
    pub fn host_view(&self, host_id: Id) -> HostView {
        self.service.borrow().pool().view(host_id).clone()
    }

    /// Returns a snapshot of the service counters.
    pub fn counters(&self) -> ServiceCounters {
        self.service.borrow().counters()
    }

    /// Returns the current state of the given server.
    pub fn server_state(&self, server_uid: ServerUid) -> ServerState {
        self.service.borrow().server(server_uid).unwrap().borrow().state()
    }

    /// Returns the simulation config.
    pub fn config(&self) -> Rc<SimulationConfig> {
        self.config.clone()
    }

    /// Returns the injected tracer.
    pub fn logger(&self) -> Rc<RefCell<Box<dyn Logger>>> {
        self.logger.clone()
    }

    /// Creates a simulation context with the specified name (e.g. for
    /// driving the simulation from test code).
    pub fn create_context<S>(&mut self, name: S) -> SimulationContext
    where
        S: AsRef<str>,
    {
        self.sim.create_context(name)
    }

    /// Returns the identifier of the component with the given name.
    pub fn lookup_id(&self, name: &str) -> Id {
        self.sim.lookup_id(name)
    }

    /// Performs the specified number of steps through the simulation.
    pub fn steps(&mut self, step_count: u64) -> bool {
        self.sim.steps(step_count)
    }

    /// Steps through the simulation with the specified duration limit.
    pub fn step_for_duration(&mut self, duration: f64) -> bool {
        self.sim.step_for_duration(duration)
    }

    /// Steps through the simulation until the specified time.
    pub fn step_until_time(&mut self, time: f64) -> bool {
        self.sim.step_until_time(time)
    }

    /// Steps through the simulation until there are no pending events left.
    pub fn step_until_no_events(&mut self) {
        self.sim.step_until_no_events();
    }

    /// Returns the current simulation time.
    pub fn current_time(&self) -> f64 {
        self.sim.time()
    }

    /// Returns the total number of created events.
    pub fn event_count(&self) -> u64 {
        self.sim.event_count()
    }
}
