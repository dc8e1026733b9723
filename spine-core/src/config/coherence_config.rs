use serde::{Deserialize, Serialize};

use crate::constants;

/// Coherence-engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoherenceConfig {
    /// Recent Active events pulled into the evaluation window.
    pub window_size: usize,
    /// Oracle findings below this confidence are logged, not acted on.
    pub actionability_threshold: f64,
    /// Timeout on a single oracle call, seconds.
    pub oracle_timeout_secs: u64,
    /// HTTP oracle endpoint. Empty means no remote oracle is configured
    /// and construction of the HTTP client fails fast.
    pub oracle_endpoint: String,
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self {
            window_size: constants::DEFAULT_WINDOW_SIZE,
            actionability_threshold: constants::DEFAULT_ACTIONABILITY_THRESHOLD,
            oracle_timeout_secs: constants::DEFAULT_ORACLE_TIMEOUT_SECS,
            oracle_endpoint: String::new(),
        }
    }
}
