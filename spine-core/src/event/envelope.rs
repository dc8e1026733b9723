//! The inbound wire contract. Publishers submit envelopes over the event
//! bus; the gateway validates, deduplicates, and durably records them
//! before anything else happens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::story_event::EventType;
use crate::errors::IntakeError;

fn default_confidence() -> f64 {
    1.0
}

/// A story-event envelope as submitted by a publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub agent_id: String,
    pub event_type: EventType,
    pub content: String,
    pub source_service: String,
    /// Opaque pointer into the publisher's own database. Together with
    /// `agent_id` and `source_service` it forms the idempotency key.
    #[serde(default)]
    pub local_reference: Option<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub causal_parents: Vec<String>,
}

impl EventEnvelope {
    /// Field-level validation. Delivery is at-least-once, so rejections
    /// here are safe for publishers to treat as terminal.
    pub fn validate(&self, max_content_len: usize) -> Result<(), IntakeError> {
        if self.agent_id.trim().is_empty() {
            return Err(IntakeError::InvalidEnvelope {
                field: "agent_id",
                reason: "must not be empty".into(),
            });
        }
        if self.content.trim().is_empty() {
            return Err(IntakeError::InvalidEnvelope {
                field: "content",
                reason: "must not be empty".into(),
            });
        }
        if self.content.len() > max_content_len {
            return Err(IntakeError::InvalidEnvelope {
                field: "content",
                reason: format!("length {} exceeds maximum {}", self.content.len(), max_content_len),
            });
        }
        if self.source_service.trim().is_empty() {
            return Err(IntakeError::InvalidEnvelope {
                field: "source_service",
                reason: "must not be empty".into(),
            });
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(IntakeError::InvalidEnvelope {
                field: "confidence",
                reason: format!("{} is outside [0.0, 1.0]", self.confidence),
            });
        }
        Ok(())
    }

    /// Idempotency key: blake3 of `(agent_id, source_service,
    /// local_reference)`. `None` when the publisher supplied no local
    /// reference — such envelopes are never deduplicated.
    pub fn idempotency_key(&self) -> Option<String> {
        let local_ref = self.local_reference.as_deref()?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.agent_id.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(self.source_service.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(local_ref.as_bytes());
        Some(hasher.finalize().to_hex().to_string())
    }
}

/// Acknowledgment returned to the publisher once the envelope is durably
/// intake-logged. Arrival of the ack does NOT mean coherence analysis ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestAck {
    pub event_id: String,
    pub agent_id: String,
    /// Per-agent intake sequence assigned to this event.
    pub intake_seq: i64,
    /// The agent's graph version at ack time. A reader that needs
    /// read-your-writes waits for the cache to reach at least this + 1.
    pub graph_version_floor: u64,
    /// True when this delivery matched an earlier envelope's idempotency
    /// key and no new event was created.
    pub deduplicated: bool,
}
