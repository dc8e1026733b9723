use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contradiction::ContradictionFinding;
use super::resolution::Resolution;

/// How one ingestion ended, from the scorer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionOutcome {
    /// No actionable contradiction.
    Clean,
    /// Contradiction found and fully resolved by belief revision.
    Resolved,
    /// Contradiction found but the cascade needed human review.
    NeedsReview,
}

/// Rolling per-agent coherence metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceScore {
    pub agent_id: String,
    /// Scalar in [0, 1]. 1.0 = no recent contradictions.
    pub value: f64,
    pub last_computed_at: DateTime<Utc>,
}

impl CoherenceScore {
    pub fn baseline(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            value: 1.0,
            last_computed_at: Utc::now(),
        }
    }
}

/// What the coherence engine did with one event. Consumed by the lane
/// (for scorer updates and alerting) and returned from replay paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub event_id: String,
    pub agent_id: String,
    /// Graph version after the final mutation of this ingestion.
    pub graph_version: u64,
    /// Actionable contradictions found (empty on a clean commit).
    pub contradictions: Vec<ContradictionFinding>,
    /// Present when belief revision ran.
    pub resolution: Option<Resolution>,
    pub outcome: IngestionOutcome,
}
