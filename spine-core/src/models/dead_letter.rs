use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event parked after retry exhaustion. The owning lane is halted
/// until the entry is replayed; ordering is preserved at the cost of
/// availability for that one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetter {
    /// Row id in the dead_letters table.
    pub id: i64,
    pub agent_id: String,
    pub event_id: String,
    /// Rendered error chain from the final attempt.
    pub error: String,
    pub retry_count: u32,
    pub parked_at: DateTime<Utc>,
}
