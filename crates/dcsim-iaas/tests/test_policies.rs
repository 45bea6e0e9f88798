use dcsim_core::Id;

use dcsim_iaas::core::common::Flavor;
use dcsim_iaas::core::host::HostModel;
use dcsim_iaas::core::policies::{ActiveBalanced, FirstFit, MemoryBalanced};
use dcsim_iaas::core::policy::{allocation_policy_resolver, AllocationPolicy};
use dcsim_iaas::core::pool::ResourcePool;
use dcsim_iaas::core::server::{Server, VmImage};

fn make_server(cpu_count: u32, memory_size: u64) -> Server {
    Server::new(1, "vm", Flavor::new(cpu_count, memory_size), VmImage::new("work", None))
}

fn make_pool(models: &[(u32, u64)]) -> ResourcePool {
    let mut pool = ResourcePool::new();
    for (i, (cpu_count, memory_size)) in models.iter().enumerate() {
        let host_id = i as Id;
        pool.add_host(
            host_id,
            &HostModel {
                cpu_count: *cpu_count,
                memory_size: *memory_size,
            },
        );
        pool.set_available(host_id, true);
    }
    pool
}

#[test]
fn test_first_fit_picks_first_fitting_host() {
    let pool = make_pool(&[(2, 1024), (8, 8192), (8, 8192)]);
    let server = make_server(4, 1024);
    assert_eq!(FirstFit::new().select_host(&server, &pool), Some(1));
}

#[test]
fn test_first_fit_returns_none_when_nothing_fits() {
    let pool = make_pool(&[(2, 1024), (8, 8192)]);
    let server = make_server(16, 1024);
    assert_eq!(FirstFit::new().select_host(&server, &pool), None);
    assert!(!pool.fits_anywhere(&server.flavor));
}

#[test]
fn test_first_fit_sees_reservations() {
    let mut pool = make_pool(&[(4, 4096), (4, 4096)]);
    pool.allocate(0, 10, &Flavor::new(3, 1024));
    let server = make_server(2, 512);
    assert_eq!(FirstFit::new().select_host(&server, &pool), Some(1));
}

#[test]
fn test_first_fit_ignores_unavailable_hosts() {
    let mut pool = make_pool(&[(4, 4096), (4, 4096)]);
    pool.set_available(0, false);
    let server = make_server(2, 512);
    assert_eq!(FirstFit::new().select_host(&server, &pool), Some(1));
    pool.set_available(1, false);
    assert_eq!(FirstFit::new().select_host(&server, &pool), None);
}

#[test]
fn test_active_balanced_picks_least_loaded_host() {
    let mut pool = make_pool(&[(4, 4096), (4, 4096)]);
    pool.allocate(0, 10, &Flavor::new(1, 256));
    pool.allocate(0, 11, &Flavor::new(1, 256));
    pool.allocate(1, 12, &Flavor::new(1, 256));
    let server = make_server(1, 256);
    assert_eq!(ActiveBalanced::new().select_host(&server, &pool), Some(1));
}

#[test]
fn test_memory_balanced_picks_most_free_memory() {
    let mut pool = make_pool(&[(4, 4096), (4, 8192)]);
    let server = make_server(1, 256);
    assert_eq!(MemoryBalanced::new().select_host(&server, &pool), Some(1));
    pool.allocate(1, 10, &Flavor::new(1, 5000));
    assert_eq!(MemoryBalanced::new().select_host(&server, &pool), Some(0));
}

#[test]
fn test_pool_accounts_each_server_once() {
    let mut pool = make_pool(&[(4, 4096)]);
    let flavor = Flavor::new(2, 1024);
    pool.allocate(0, 10, &flavor);
    pool.allocate(0, 10, &flavor);
    let view = pool.view(0);
    assert_eq!(view.active_servers, 1);
    assert_eq!(view.provisioned_cores, 2);
    assert_eq!(view.available_memory, 3072);

    assert!(pool.release(0, 10, &flavor));
    assert!(!pool.release(0, 10, &flavor));
    let view = pool.view(0);
    assert_eq!(view.active_servers, 0);
    assert_eq!(view.provisioned_cores, 0);
    assert_eq!(view.available_memory, 4096);
}

#[test]
// The maximum model is elementwise over all registered hosts: a flavor may
// pass the feasibility check even if no single host combines both maxima.
fn test_pool_tracks_elementwise_max_model() {
    let pool = make_pool(&[(4, 1024), (2, 8192)]);
    assert_eq!(pool.max_cores(), 4);
    assert_eq!(pool.max_memory(), 8192);
    assert!(pool.fits_anywhere(&Flavor::new(4, 8192)));
    assert!(!pool.fits_anywhere(&Flavor::new(5, 1024)));
    assert!(!pool.fits_anywhere(&Flavor::new(1, 8193)));
}

#[test]
fn test_resolver_known_policies() {
    let pool = make_pool(&[(4, 4096)]);
    let server = make_server(1, 256);
    for name in ["FirstFit", "ActiveBalanced", "MemoryBalanced"] {
        let policy = allocation_policy_resolver(name);
        assert_eq!(policy.select_host(&server, &pool), Some(0));
    }
}

#[test]
#[should_panic(expected = "can't resolve allocation policy")]
fn test_resolver_rejects_unknown_policy() {
    allocation_policy_resolver("PowerSave");
}
