//! Common data types.

use serde::{Deserialize, Serialize};

/// The resource shape requested by a VM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flavor {
    pub cpu_count: u32,
    pub memory_size: u64,
}

impl Flavor {
    pub fn new(cpu_count: u32, memory_size: u64) -> Self {
        Self { cpu_count, memory_size }
    }
}

/// 128-bit server identifier drawn from the seeded simulation-wide random
/// stream, so that identifiers are reproducible across runs.
pub type ServerUid = u128;

/// Formats a server uid as fixed-width hex for logs.
pub fn uid_str(uid: ServerUid) -> String {
    format!("{:032x}", uid)
}
