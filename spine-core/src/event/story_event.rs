use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::Confidence;
use super::envelope::EventEnvelope;

/// What kind of life-story statement an event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Conversation,
    KnowledgeAcquired,
    KnowledgeRemoved,
    Reflection,
    Deployment,
    Custom,
}

impl EventType {
    /// Stable string form used in storage and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Conversation => "conversation",
            EventType::KnowledgeAcquired => "knowledge_acquired",
            EventType::KnowledgeRemoved => "knowledge_removed",
            EventType::Reflection => "reflection",
            EventType::Deployment => "deployment",
            EventType::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "conversation" => Some(EventType::Conversation),
            "knowledge_acquired" => Some(EventType::KnowledgeAcquired),
            "knowledge_removed" => Some(EventType::KnowledgeRemoved),
            "reflection" => Some(EventType::Reflection),
            "deployment" => Some(EventType::Deployment),
            "custom" => Some(EventType::Custom),
            _ => None,
        }
    }
}

/// Lifecycle status of a committed event. Events are never deleted;
/// only the revision resolver moves them away from `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Active,
    Superseded,
    Retracted,
    /// Auto-resolution gave up (cascade depth exceeded); a human decides.
    NeedsReview,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Superseded => "superseded",
            EventStatus::Retracted => "retracted",
            EventStatus::NeedsReview => "needs_review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(EventStatus::Active),
            "superseded" => Some(EventStatus::Superseded),
            "retracted" => Some(EventStatus::Retracted),
            "needs_review" => Some(EventStatus::NeedsReview),
            _ => None,
        }
    }

    /// Whether the event participates in the agent's current story.
    pub fn is_active(self) -> bool {
        matches!(self, EventStatus::Active)
    }
}

/// A committed story event. Immutable once written except for
/// `status`/`superseded_by`, which only the revision resolver touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryEvent {
    /// UUID v4 identifier.
    pub event_id: String,
    pub agent_id: String,
    pub event_type: EventType,
    /// Free-text narrative statement: a claim, fact, or action description.
    pub content: String,
    /// The collaborating service that published this event.
    pub source_service: String,
    /// Opaque pointer back to the publisher's own record. Never dereferenced.
    pub local_reference: Option<String>,
    /// Publisher-asserted trust in the statement.
    pub confidence: Confidence,
    /// Publisher-asserted creation time (not ingestion time).
    pub timestamp: DateTime<Utc>,
    /// When the intake log durably recorded this event.
    pub ingested_at: DateTime<Utc>,
    /// Events this one logically depends on or may conflict with.
    pub causal_parents: Vec<String>,
    pub status: EventStatus,
    /// Set only when status has transitioned away from Active.
    pub superseded_by: Option<String>,
    /// Per-agent monotonic sequence assigned at durable intake.
    /// The order authority for the agent's lane.
    pub intake_seq: i64,
    /// blake3 hash of the content, for audit comparisons.
    pub content_hash: String,
}

impl StoryEvent {
    /// Build a committed event from a validated envelope.
    pub fn from_envelope(envelope: &EventEnvelope, event_id: String, intake_seq: i64) -> Self {
        Self {
            event_id,
            agent_id: envelope.agent_id.clone(),
            event_type: envelope.event_type,
            content: envelope.content.clone(),
            source_service: envelope.source_service.clone(),
            local_reference: envelope.local_reference.clone(),
            confidence: Confidence::new(envelope.confidence),
            timestamp: envelope.timestamp,
            ingested_at: Utc::now(),
            causal_parents: envelope.causal_parents.clone(),
            status: EventStatus::Active,
            superseded_by: None,
            intake_seq,
            content_hash: blake3::hash(envelope.content.as_bytes()).to_hex().to_string(),
        }
    }
}

/// Identity equality: two events are equal if they share an event_id.
/// Content comparison goes through `content_hash`.
impl PartialEq for StoryEvent {
    fn eq(&self, other: &Self) -> bool {
        self.event_id == other.event_id
    }
}

impl Eq for StoryEvent {}
