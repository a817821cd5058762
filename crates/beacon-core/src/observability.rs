use serde::{Deserialize, Serialize};

/// Per-scope counts by lifecycle state, for status dumps.
///
/// Unset keys have no entry and are therefore never counted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateCounts {
    pub loading: usize,
    pub settled: usize,
    pub error: usize,
}

impl StateCounts {
    /// Total number of keys with a recorded state.
    pub fn tracked(&self) -> usize {
        self.loading + self.settled + self.error
    }
}
