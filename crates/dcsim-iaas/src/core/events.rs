//! Simulation events exchanged by the provisioning components.

// SCHEDULER EVENTS ////////////////////////////////////////////////////////////////////////////////

pub mod scheduler {
    use serde::Serialize;

    /// Fires a quantum-aligned scheduling cycle (emitted by the service to
    /// itself, at most one in flight).
    #[derive(Clone, Serialize)]
    pub struct ScheduleCycle {}
}

// HOST EVENTS /////////////////////////////////////////////////////////////////////////////////////

pub mod host {
    use serde::Serialize;

    use dcsim_core::Id;

    use crate::core::common::{Flavor, ServerUid};
    use crate::core::error::SpawnFailureReason;
    use crate::core::host::HostState;
    use crate::core::server::{ServerState, VmImage};

    /// Asks a host to spawn a server.
    #[derive(Clone, Serialize)]
    pub struct SpawnServerRequest {
        pub server_uid: ServerUid,
        pub flavor: Flavor,
        pub image: VmImage,
    }

    /// Host reply when a spawn request is refused.
    #[derive(Clone, Serialize)]
    pub struct SpawnServerFailed {
        pub server_uid: ServerUid,
        pub host_id: Id,
        pub reason: SpawnFailureReason,
    }

    /// Host-internal event marking the end of a VM's run duration.
    #[derive(Clone, Serialize)]
    pub struct FinishServer {
        pub server_uid: ServerUid,
    }

    /// Pushed by a host to its listeners on up/down transitions.
    #[derive(Clone, Serialize)]
    pub struct HostStateChanged {
        pub host_id: Id,
        pub state: HostState,
    }

    /// Pushed by a host to its listeners on VM lifecycle transitions.
    #[derive(Clone, Serialize)]
    pub struct ServerStateChanged {
        pub server_uid: ServerUid,
        pub state: ServerState,
    }
}

// SERVICE EVENTS //////////////////////////////////////////////////////////////////////////////////

pub mod service {
    use serde::Serialize;

    use dcsim_core::Id;

    use crate::core::common::Flavor;
    use crate::core::metrics::ServiceCounters;

    /// Counter snapshot broadcast after every counter mutation.
    #[derive(Clone, Serialize)]
    pub struct MetricsAvailable {
        pub host_count: u32,
        pub available_host_count: u32,
        pub counters: ServiceCounters,
    }

    #[derive(Clone, Serialize)]
    pub struct HypervisorAvailable {
        pub host_id: Id,
    }

    #[derive(Clone, Serialize)]
    pub struct HypervisorUnavailable {
        pub host_id: Id,
    }

    /// Trace of an accepted submission.
    #[derive(Clone, Serialize)]
    pub struct VmSubmission {
        pub name: String,
        pub flavor: Flavor,
    }

    /// A submission rejected as infeasible on any known host model.
    #[derive(Clone, Serialize)]
    pub struct VmSubmissionInvalid {
        pub name: String,
    }

    #[derive(Clone, Serialize)]
    pub struct VmScheduled {
        pub name: String,
    }

    #[derive(Clone, Serialize)]
    pub struct VmStopped {
        pub name: String,
    }
}
