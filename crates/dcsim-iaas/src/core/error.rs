//! Service error types.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to provisioning clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ProvisioningError {
    /// The client (or the whole service) was closed before the call.
    #[error("client is closed")]
    ClientClosed,
}

/// Reason reported by a host refusing to spawn a server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SpawnFailureReason {
    HostDown,
    InsufficientCapacity,
}

impl Display for SpawnFailureReason {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            SpawnFailureReason::HostDown => write!(f, "host is down"),
            SpawnFailureReason::InsufficientCapacity => write!(f, "insufficient capacity"),
        }
    }
}
