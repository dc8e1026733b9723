//! Model serialization and identity semantics.

use chrono::Utc;
use spine_core::event::{Confidence, EventEnvelope, EventStatus, EventType, StoryEvent};
use spine_core::models::{ContradictionAxis, EdgeKind, OracleFinding};

fn envelope() -> EventEnvelope {
    EventEnvelope {
        agent_id: "a1".to_string(),
        event_type: EventType::KnowledgeAcquired,
        content: "budget is $500".to_string(),
        source_service: "knowledge-service".to_string(),
        local_reference: None,
        confidence: 0.7,
        timestamp: Utc::now(),
        causal_parents: vec![],
    }
}

#[test]
fn confidence_clamps() {
    assert_eq!(Confidence::new(1.7).value(), 1.0);
    assert_eq!(Confidence::new(-0.2).value(), 0.0);
    assert_eq!(Confidence::new(f64::NAN).value(), 0.0);
    assert_eq!(Confidence::new(0.42).value(), 0.42);
}

#[test]
fn story_event_identity_is_event_id() {
    let env = envelope();
    let a = StoryEvent::from_envelope(&env, "e1".to_string(), 1);
    let mut b = StoryEvent::from_envelope(&env, "e1".to_string(), 2);
    b.content = "something else".to_string();
    // Same id, different content: still equal (entity identity).
    assert_eq!(a, b);
    let c = StoryEvent::from_envelope(&env, "e2".to_string(), 3);
    assert_ne!(a, c);
}

#[test]
fn from_envelope_starts_active() {
    let event = StoryEvent::from_envelope(&envelope(), "e1".to_string(), 1);
    assert_eq!(event.status, EventStatus::Active);
    assert_eq!(event.superseded_by, None);
    assert!(!event.content_hash.is_empty());
}

#[test]
fn status_round_trips_through_str() {
    for status in [
        EventStatus::Active,
        EventStatus::Superseded,
        EventStatus::Retracted,
        EventStatus::NeedsReview,
    ] {
        assert_eq!(EventStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(EventStatus::parse("deleted"), None);
}

#[test]
fn event_type_round_trips_through_str() {
    for ty in [
        EventType::Conversation,
        EventType::KnowledgeAcquired,
        EventType::KnowledgeRemoved,
        EventType::Reflection,
        EventType::Deployment,
        EventType::Custom,
    ] {
        assert_eq!(EventType::parse(ty.as_str()), Some(ty));
    }
}

#[test]
fn edge_kind_round_trips_through_str() {
    assert_eq!(EdgeKind::parse("causal"), Some(EdgeKind::Causal));
    assert_eq!(EdgeKind::parse("contradicts"), Some(EdgeKind::Contradicts));
    assert_eq!(EdgeKind::parse("supports"), None);
}

#[test]
fn oracle_finding_serde_uses_snake_case_axes() {
    let finding = OracleFinding {
        index: 2,
        axis: ContradictionAxis::Fact,
        confidence: 0.85,
    };
    let json = serde_json::to_string(&finding).unwrap();
    assert!(json.contains("\"fact\""), "got {json}");
    let back: OracleFinding = serde_json::from_str(&json).unwrap();
    assert_eq!(back.axis, ContradictionAxis::Fact);
}
