use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventType;

/// One statement in a narrative summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStatement {
    pub event_id: String,
    pub event_type: EventType,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded-size digest of an agent's current story, derived from the
/// most recent Active nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeSummary {
    /// Most recent Active statements, newest first.
    pub statements: Vec<SummaryStatement>,
    /// Total Active nodes the agent has (not just the window).
    pub active_count: usize,
    /// Nodes currently parked in NeedsReview.
    pub open_reviews: usize,
    pub generated_at: DateTime<Utc>,
}

/// What a collaborating service gets back from a context read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeContext {
    pub agent_id: String,
    pub summary: NarrativeSummary,
    pub coherence_score: f64,
    /// Freshness token. Readers needing read-your-writes compare this
    /// against the version in their own ingest ack.
    pub graph_version: u64,
}
