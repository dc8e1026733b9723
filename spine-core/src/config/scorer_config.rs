use serde::{Deserialize, Serialize};

use crate::constants;

/// Coherence-scorer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Recent ingestion outcomes kept per agent.
    pub window: usize,
    /// Score below which a low-coherence alert fires (crossing downward).
    pub alert_threshold: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            window: constants::DEFAULT_SCORER_WINDOW,
            alert_threshold: constants::DEFAULT_ALERT_THRESHOLD,
        }
    }
}
