use dcsim_core::Simulation;

use dcsim_iaas::core::config::SimulationConfig;
use dcsim_iaas::simulation::CloudSimulation;

fn name_wrapper(file_name: &str) -> String {
    format!("test-configs/{}", file_name)
}

#[test]
fn test_config_defaults() {
    let config = SimulationConfig::default();
    assert_eq!(config.scheduling_quantum, 60.);
    assert_eq!(config.allocation_policy, "FirstFit");
    assert_eq!(config.message_delay, 0.);
    assert_eq!(config.vm_start_duration, 0.);
    assert_eq!(config.vm_stop_duration, 0.);
    assert!(config.hosts.is_empty());
}

#[test]
fn test_config_from_file() {
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml"));
    assert_eq!(config.scheduling_quantum, 60.);
    assert_eq!(config.allocation_policy, "FirstFit");
    assert_eq!(config.number_of_hosts(), 2);
    // omitted fields fall back to defaults
    assert_eq!(config.vm_start_duration, 0.);
}

#[test]
fn test_hosts_are_created_from_config() {
    let sim = Simulation::new(123);
    let config = SimulationConfig::from_file(&name_wrapper("config.yaml"));
    let cloud_sim = CloudSimulation::new(sim, config);

    let h1 = cloud_sim.lookup_id("host1");
    let h2 = cloud_sim.lookup_id("host2");
    let service = cloud_sim.service();
    assert_eq!(service.borrow().pool().host_count(), 2);
    assert!(service.borrow().pool().is_available(h1));
    assert!(service.borrow().pool().is_available(h2));
    assert_eq!(cloud_sim.host_view(h1).cpu_total, 4);
    assert_eq!(cloud_sim.host_view(h2).memory_total, 8192);
}

#[test]
#[should_panic(expected = "scheduling quantum must be positive")]
fn test_zero_quantum_is_rejected() {
    SimulationConfig::new(0.);
}
