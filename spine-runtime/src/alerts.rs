//! The coherence alert channel: a broadcast consumed by monitoring
//! collaborators. Lossy for slow receivers, which is acceptable for
//! alerting; the authoritative state is always in the store.

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::info;

use spine_core::models::{AlertKind, CoherenceAlert};

const ALERT_CHANNEL_CAPACITY: usize = 256;

/// Cloneable handle to the alert broadcast.
#[derive(Clone)]
pub struct AlertBus {
    sender: broadcast::Sender<CoherenceAlert>,
}

impl AlertBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoherenceAlert> {
        self.sender.subscribe()
    }

    /// Score crossed the low-coherence threshold downward.
    pub fn emit_low_coherence(&self, agent_id: &str, score: f64, threshold: f64) {
        self.emit(CoherenceAlert {
            agent_id: agent_id.to_string(),
            kind: AlertKind::LowCoherence,
            coherence_score: score,
            threshold,
            timestamp: Utc::now(),
        });
    }

    /// Belief revision parked something in NeedsReview.
    pub fn emit_review_required(&self, agent_id: &str, score: f64, threshold: f64) {
        self.emit(CoherenceAlert {
            agent_id: agent_id.to_string(),
            kind: AlertKind::ReviewRequired,
            coherence_score: score,
            threshold,
            timestamp: Utc::now(),
        });
    }

    fn emit(&self, alert: CoherenceAlert) {
        info!(agent_id = %alert.agent_id, kind = ?alert.kind, score = alert.coherence_score, "coherence alert");
        // No subscribers is fine.
        let _ = self.sender.send(alert);
    }
}

impl Default for AlertBus {
    fn default() -> Self {
        Self::new()
    }
}
