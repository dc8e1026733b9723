use serde::{Deserialize, Serialize};

use crate::constants;

/// Belief-revision resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionConfig {
    /// Cascade depth beyond which the chain goes to NeedsReview.
    pub max_cascade_depth: usize,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            max_cascade_depth: constants::DEFAULT_MAX_CASCADE_DEPTH,
        }
    }
}
