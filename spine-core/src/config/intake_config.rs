use serde::{Deserialize, Serialize};

use crate::constants;

/// Ingestion-gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Maximum accepted content length, in bytes.
    pub max_content_len: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_content_len: constants::DEFAULT_MAX_CONTENT_LEN,
        }
    }
}
