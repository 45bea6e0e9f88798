//! Simulated hypervisor host.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use log::Level;
use serde::{Deserialize, Serialize};

use dcsim_core::context::SimulationContext;
use dcsim_core::event::Event;
use dcsim_core::handler::EventHandler;
use dcsim_core::Id;
use dcsim_core::{dispatch, sim_log};

use crate::core::common::{uid_str, Flavor, ServerUid};
use crate::core::config::SimulationConfig;
use crate::core::error::SpawnFailureReason;
use crate::core::events::host::{
    FinishServer, HostStateChanged, ServerStateChanged, SpawnServerFailed, SpawnServerRequest,
};
use crate::core::server::{Server, ServerState, VmImage};

/// Resource capacity of a host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostModel {
    pub cpu_count: u32,
    pub memory_size: u64,
}

/// Observable host state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum HostState {
    Up,
    Down,
}

impl Display for HostState {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            HostState::Up => write!(f, "up"),
            HostState::Down => write!(f, "down"),
        }
    }
}

/// A host executing VMs.
///
/// The host keeps its own capacity accounting, independent of the
/// speculative views held by the provisioning service, and never
/// oversubscribes itself. Spawn requests arrive as events; state and VM
/// lifecycle changes are pushed to registered listeners as events too, so
/// every spawn completes asynchronously from the caller's point of view.
pub struct VirtHost {
    pub id: Id,
    model: HostModel,
    state: HostState,
    cpu_used: u32,
    memory_used: u64,
    vms: HashMap<ServerUid, Flavor>,
    listeners: Vec<Id>,
    ctx: SimulationContext,
    config: Rc<SimulationConfig>,
}

impl VirtHost {
    pub fn new(model: HostModel, ctx: SimulationContext, config: Rc<SimulationConfig>) -> Self {
        Self {
            id: ctx.id(),
            model,
            state: HostState::Up,
            cpu_used: 0,
            memory_used: 0,
            vms: HashMap::new(),
            listeners: Vec::new(),
            ctx,
            config,
        }
    }

    pub fn model(&self) -> HostModel {
        self.model
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn cpu_used(&self) -> u32 {
        self.cpu_used
    }

    pub fn memory_used(&self) -> u64 {
        self.memory_used
    }

    pub fn vm_count(&self) -> usize {
        self.vms.len()
    }

    pub fn add_listener(&mut self, listener: Id) {
        if !self.listeners.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    pub fn remove_listener(&mut self, listener: Id) {
        self.listeners.retain(|id| *id != listener);
    }

    /// Advisory capacity check consulted by the scheduler before placement.
    pub fn can_fit(&self, server: &Server) -> bool {
        self.state == HostState::Up
            && self.cpu_used + server.flavor.cpu_count <= self.model.cpu_count
            && self.memory_used + server.flavor.memory_size <= self.model.memory_size
    }

    /// Transitions the host and notifies the listeners.
    pub fn set_state(&mut self, state: HostState) {
        if self.state == state {
            return;
        }
        self.state = state;
        sim_log!(Level::Debug, self.ctx, "host is now {}", state);
        for listener in &self.listeners {
            self.ctx.emit_now(
                HostStateChanged {
                    host_id: self.id,
                    state,
                },
                *listener,
            );
        }
    }

    /// Stops a running VM explicitly (used for workloads without a fixed
    /// run duration).
    pub fn stop_server(&mut self, server_uid: ServerUid) {
        self.on_finish_server(server_uid);
    }

    fn reject_spawn(&mut self, server_uid: ServerUid, requester: Id, reason: SpawnFailureReason) {
        sim_log!(Level::Debug, self.ctx, "refused to spawn server {}: {}", uid_str(server_uid), reason);
        self.ctx.emit(
            SpawnServerFailed {
                server_uid,
                host_id: self.id,
                reason,
            },
            requester,
            self.config.message_delay,
        );
    }

    fn on_spawn_request(&mut self, server_uid: ServerUid, flavor: Flavor, image: VmImage, requester: Id) {
        if self.state != HostState::Up {
            self.reject_spawn(server_uid, requester, SpawnFailureReason::HostDown);
            return;
        }
        if self.cpu_used + flavor.cpu_count > self.model.cpu_count
            || self.memory_used + flavor.memory_size > self.model.memory_size
        {
            self.reject_spawn(server_uid, requester, SpawnFailureReason::InsufficientCapacity);
            return;
        }
        self.cpu_used += flavor.cpu_count;
        self.memory_used += flavor.memory_size;
        self.vms.insert(server_uid, flavor);
        sim_log!(Level::Debug, self.ctx, "spawning server {} ({})", image.name, uid_str(server_uid));

        let start_duration = self.config.vm_start_duration;
        for listener in &self.listeners {
            self.ctx.emit(
                ServerStateChanged {
                    server_uid,
                    state: ServerState::Active,
                },
                *listener,
                start_duration,
            );
        }
        if let Some(run_duration) = image.run_duration {
            self.ctx.emit_self(FinishServer { server_uid }, start_duration + run_duration);
        }
    }

    fn on_finish_server(&mut self, server_uid: ServerUid) {
        let flavor = match self.vms.remove(&server_uid) {
            Some(flavor) => flavor,
            None => {
                sim_log!(Level::Debug, self.ctx, "server {} is not running here", uid_str(server_uid));
                return;
            }
        };
        self.cpu_used -= flavor.cpu_count;
        self.memory_used -= flavor.memory_size;
        sim_log!(Level::Debug, self.ctx, "server {} finished", uid_str(server_uid));
        for listener in &self.listeners {
            self.ctx.emit(
                ServerStateChanged {
                    server_uid,
                    state: ServerState::Shutoff,
                },
                *listener,
                self.config.vm_stop_duration,
            );
        }
    }
}

impl EventHandler for VirtHost {
    fn on(&mut self, event: Event) {
        let src = event.src;
        dispatch!(match event {
            SpawnServerRequest { server_uid, flavor, image } => {
                self.on_spawn_request(server_uid, flavor, image, src);
            }
            FinishServer { server_uid } => {
                self.on_finish_server(server_uid);
            }
        })
    }
}
