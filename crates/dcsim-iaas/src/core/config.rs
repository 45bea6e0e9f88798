//! Service configuration.

use serde::{Deserialize, Serialize};

/// Auxiliary structure to parse [`SimulationConfig`] from a file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SimulationConfigRaw {
    /// duration between scheduling cycle boundaries
    pub scheduling_quantum: Option<f64>,
    /// allocation policy used by the scheduler
    pub allocation_policy: Option<String>,
    /// message trip time between the service and the hosts
    pub message_delay: Option<f64>,
    /// vm initialization duration
    pub vm_start_duration: Option<f64>,
    /// vm deallocation duration
    pub vm_stop_duration: Option<f64>,
    /// hosts registered on simulation start
    pub hosts: Option<Vec<HostConfig>>,
}

/// Represents physical host(s) configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct HostConfig {
    /// Host name. Should be set if count = 1
    pub name: Option<String>,
    /// Host name prefix. Full name is produced by appending the instance
    /// number to the prefix. Should be set if count > 1
    pub name_prefix: Option<String>,
    /// host CPU capacity
    pub cpus: u32,
    /// host memory capacity
    pub memory: u64,
    /// number of such hosts
    pub count: Option<u32>,
}

/// Holds the configuration of the provisioning service.
#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct SimulationConfig {
    /// duration between scheduling cycle boundaries
    pub scheduling_quantum: f64,
    /// allocation policy used by the scheduler
    pub allocation_policy: String,
    /// message trip time between the service and the hosts
    pub message_delay: f64,
    /// vm initialization duration
    pub vm_start_duration: f64,
    /// vm deallocation duration
    pub vm_stop_duration: f64,
    /// hosts registered on simulation start
    pub hosts: Vec<HostConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scheduling_quantum: 60.,
            allocation_policy: "FirstFit".to_string(),
            message_delay: 0.,
            vm_start_duration: 0.,
            vm_stop_duration: 0.,
            hosts: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Creates a config with the specified scheduling quantum and the
    /// default values for everything else.
    pub fn new(scheduling_quantum: f64) -> Self {
        assert!(scheduling_quantum > 0., "scheduling quantum must be positive");
        Self {
            scheduling_quantum,
            ..Default::default()
        }
    }

    /// Creates a config from a YAML file, filling omitted fields with
    /// defaults.
    pub fn from_file(file_name: &str) -> Self {
        let raw: SimulationConfigRaw = serde_yaml::from_str(
            &std::fs::read_to_string(file_name)
                .unwrap_or_else(|_| panic!("can't read config file {}", file_name)),
        )
        .unwrap_or_else(|err| panic!("can't parse config file {}: {}", file_name, err));
        let defaults = Self::default();
        let config = Self {
            scheduling_quantum: raw.scheduling_quantum.unwrap_or(defaults.scheduling_quantum),
            allocation_policy: raw.allocation_policy.unwrap_or(defaults.allocation_policy),
            message_delay: raw.message_delay.unwrap_or(defaults.message_delay),
            vm_start_duration: raw.vm_start_duration.unwrap_or(defaults.vm_start_duration),
            vm_stop_duration: raw.vm_stop_duration.unwrap_or(defaults.vm_stop_duration),
            hosts: raw.hosts.unwrap_or_default(),
        };
        assert!(config.scheduling_quantum > 0., "scheduling quantum must be positive");
        config
    }

    /// Returns the total host count described by the config.
    pub fn number_of_hosts(&self) -> u32 {
        self.hosts.iter().map(|host| host.count.unwrap_or(1)).sum()
    }
}
