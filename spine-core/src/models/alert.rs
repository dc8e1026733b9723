use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why an alert fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Coherence score crossed the configured threshold downward.
    LowCoherence,
    /// Belief revision parked one or more events in NeedsReview.
    ReviewRequired,
}

/// Emitted on the alert channel for monitoring collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceAlert {
    pub agent_id: String,
    pub kind: AlertKind,
    pub coherence_score: f64,
    pub threshold: f64,
    pub timestamp: DateTime<Utc>,
}
