use serde::{Deserialize, Serialize};

use crate::constants;

/// Per-agent sequencer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Lane queue capacity; beyond this, intake gets AGENT_BACKPRESSURE.
    pub lane_capacity: usize,
    /// Transient-failure retries before dead-lettering.
    pub max_retries: u32,
    /// Exponential backoff base delay, milliseconds.
    pub backoff_base_ms: u64,
    /// Cap on a single backoff delay, milliseconds.
    pub backoff_cap_ms: u64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            lane_capacity: constants::DEFAULT_LANE_CAPACITY,
            max_retries: constants::DEFAULT_MAX_RETRIES,
            backoff_base_ms: constants::DEFAULT_BACKOFF_BASE_MS,
            backoff_cap_ms: constants::DEFAULT_BACKOFF_CAP_MS,
        }
    }
}
