use serde::{Deserialize, Serialize};

use crate::constants;

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path. Empty selects an in-memory database
    /// (tests and ephemeral deployments).
    pub db_path: String,
    /// Read connections in the pool.
    pub read_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: String::new(),
            read_pool_size: constants::DEFAULT_READ_POOL_SIZE,
        }
    }
}
