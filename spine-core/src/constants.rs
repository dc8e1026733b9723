//! Workspace-wide default values. Config structs reference these so the
//! documented defaults live in exactly one place.

/// Oracle findings below this confidence are logged but not acted on.
pub const DEFAULT_ACTIONABILITY_THRESHOLD: f64 = 0.6;

/// Timeout for a single scoring-oracle call, in seconds.
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 10;

/// Number of recent Active events pulled into the coherence window.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Cascade re-evaluation depth beyond which a chain is flagged for review.
pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 5;

/// Queue capacity of a per-agent lane; the backpressure bound.
pub const DEFAULT_LANE_CAPACITY: usize = 256;

/// Transient-failure retries before an event is dead-lettered.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Base delay for exponential retry backoff, in milliseconds.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 200;

/// Upper bound on a single backoff delay, in milliseconds.
pub const DEFAULT_BACKOFF_CAP_MS: u64 = 30_000;

/// Context-cache entry TTL, in seconds. Safety net in case an
/// invalidation signal is lost.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Maximum number of agents with a live cache entry.
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

/// Statements included in a narrative summary.
pub const DEFAULT_SUMMARY_STATEMENTS: usize = 10;

/// Bounded wait for a read-your-writes cache read, in milliseconds.
pub const DEFAULT_READ_YOUR_WRITES_WAIT_MS: u64 = 500;

/// Coherence score below which a low-coherence alert fires.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.4;

/// Number of recent ingestion outcomes the scorer keeps per agent.
pub const DEFAULT_SCORER_WINDOW: usize = 50;

/// Maximum accepted envelope content length, in bytes.
pub const DEFAULT_MAX_CONTENT_LEN: usize = 64 * 1024;

/// Read connections in the SQLite read pool.
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
