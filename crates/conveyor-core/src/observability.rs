use serde::{Deserialize, Serialize};

/// Task counts by status, for the control-plane stats endpoint and
/// logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueCounts {
    pub waiting: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
}
