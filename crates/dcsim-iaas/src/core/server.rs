//! Server (VM request and runtime entity) representation.

use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::common::{Flavor, ServerUid};

/// Lifecycle state of a server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ServerState {
    Build,
    Active,
    Shutoff,
    Error,
}

impl Display for ServerState {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ServerState::Build => write!(f, "build"),
            ServerState::Active => write!(f, "active"),
            ServerState::Shutoff => write!(f, "shutoff"),
            ServerState::Error => write!(f, "error"),
        }
    }
}

/// Workload descriptor attached to a server.
///
/// The provisioning service treats the image as an opaque value and hands it
/// over to the host, which interprets `run_duration` as the workload
/// lifetime (`None` means run until stopped explicitly).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VmImage {
    pub name: String,
    pub run_duration: Option<f64>,
}

impl VmImage {
    pub fn new<S: AsRef<str>>(name: S, run_duration: Option<f64>) -> Self {
        Self {
            name: name.as_ref().to_string(),
            run_duration,
        }
    }
}

/// Observer notified on every server state change, in registration order.
///
/// Watchers are invoked synchronously from the service's listener callbacks
/// and must not call back into the service.
pub trait ServerWatcher {
    fn on_server_state_changed(&mut self, server_uid: ServerUid, state: ServerState);
}

/// A VM request and, once placed, the corresponding runtime entity.
pub struct Server {
    pub uid: ServerUid,
    pub name: String,
    pub flavor: Flavor,
    pub image: VmImage,
    state: ServerState,
    watchers: Vec<Rc<RefCell<dyn ServerWatcher>>>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("uid", &self.uid)
            .field("name", &self.name)
            .field("flavor", &self.flavor)
            .field("image", &self.image)
            .field("state", &self.state)
            .finish()
    }
}

impl Server {
    pub fn new<S: AsRef<str>>(uid: ServerUid, name: S, flavor: Flavor, image: VmImage) -> Self {
        Self {
            uid,
            name: name.as_ref().to_string(),
            flavor,
            image,
            state: ServerState::Build,
            watchers: Vec::new(),
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn add_watcher(&mut self, watcher: Rc<RefCell<dyn ServerWatcher>>) {
        self.watchers.push(watcher);
    }

    pub(crate) fn set_state(&mut self, state: ServerState) {
        self.state = state;
    }

    pub(crate) fn watchers(&self) -> Vec<Rc<RefCell<dyn ServerWatcher>>> {
        self.watchers.clone()
    }
}
