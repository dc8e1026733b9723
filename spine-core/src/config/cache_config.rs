use serde::{Deserialize, Serialize};

use crate::constants;

/// Story-context cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry TTL, seconds. Safety net against lost invalidation signals.
    pub ttl_secs: u64,
    /// Maximum cached agents.
    pub max_entries: u64,
    /// Statements included in a narrative summary.
    pub summary_statements: usize,
    /// Bounded wait for read-your-writes reads, milliseconds.
    pub read_your_writes_wait_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: constants::DEFAULT_CACHE_TTL_SECS,
            max_entries: constants::DEFAULT_CACHE_MAX_ENTRIES,
            summary_statements: constants::DEFAULT_SUMMARY_STATEMENTS,
            read_your_writes_wait_ms: constants::DEFAULT_READ_YOUR_WRITES_WAIT_MS,
        }
    }
}
