//! Simulator configuration

use crate::gc::AllocationPolicy;
use crate::util::size::MB_PER_GB;

/// Default capacity: one gigabyte, in megabytes
pub const DEFAULT_CAPACITY: usize = MB_PER_GB;

/// Settings used to build a `HeapSimulator`
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Total capacity in units
    pub capacity: usize,
    /// Seed for the allocation generator; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Allocation probabilities
    pub policy: AllocationPolicy,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            capacity: DEFAULT_CAPACITY,
            seed: None,
            policy: AllocationPolicy::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        SimulatorConfig {
            capacity,
            ..Default::default()
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
