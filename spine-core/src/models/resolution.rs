use serde::{Deserialize, Serialize};

use crate::event::EventStatus;

/// A single status transition applied during belief revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub event_id: String,
    pub from_status: EventStatus,
    pub to_status: EventStatus,
    pub reason: String,
}

/// Outcome of one belief-revision pass (including its cascade).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// The event that survived the tie-break.
    pub winner_id: String,
    /// Events transitioned to Superseded, in application order.
    pub superseded: Vec<String>,
    /// Every status transition applied, for the audit trail.
    pub revisions: Vec<Revision>,
    /// Events flagged NeedsReview because the cascade hit its depth bound.
    pub needs_review: Vec<String>,
    /// Deepest cascade level reached (0 = no cascade).
    pub depth_reached: usize,
}

impl Resolution {
    /// Whether the pass left anything for a human.
    pub fn fully_resolved(&self) -> bool {
        self.needs_review.is_empty()
    }
}
