//! Built-in allocation policies.

pub mod active_balanced;
pub mod first_fit;
pub mod memory_balanced;

pub use active_balanced::ActiveBalanced;
pub use first_fit::FirstFit;
pub use memory_balanced::MemoryBalanced;
