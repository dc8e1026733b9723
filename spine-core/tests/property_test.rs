//! Property tests for the core data contracts.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use spine_core::event::{Confidence, EventEnvelope, EventType};

fn arbitrary_envelope() -> impl Strategy<Value = EventEnvelope> {
    (
        ".{0,40}",
        ".{0,200}",
        ".{0,40}",
        proptest::option::of(".{0,40}"),
        prop::num::f64::ANY,
        0i64..2_000_000_000,
        proptest::collection::vec(".{0,20}", 0..4),
    )
        .prop_map(
            |(agent_id, content, source_service, local_reference, confidence, secs, parents)| {
                EventEnvelope {
                    agent_id,
                    event_type: EventType::Custom,
                    content,
                    source_service,
                    local_reference,
                    confidence,
                    timestamp: Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now),
                    causal_parents: parents,
                }
            },
        )
}

proptest! {
    /// Validation is total: any envelope yields accept or a typed
    /// rejection, never a panic.
    #[test]
    fn validation_never_panics(envelope in arbitrary_envelope()) {
        let _ = envelope.validate(256);
    }

    /// A validated envelope always satisfies the field contract.
    #[test]
    fn accepted_envelopes_are_well_formed(envelope in arbitrary_envelope()) {
        if envelope.validate(256).is_ok() {
            prop_assert!(!envelope.agent_id.trim().is_empty());
            prop_assert!(!envelope.content.trim().is_empty());
            prop_assert!(envelope.content.len() <= 256);
            prop_assert!((0.0..=1.0).contains(&envelope.confidence));
        }
    }

    /// The idempotency key is a pure function of its three inputs.
    #[test]
    fn idempotency_key_is_deterministic(envelope in arbitrary_envelope()) {
        prop_assert_eq!(envelope.idempotency_key(), envelope.idempotency_key());
        if envelope.local_reference.is_none() {
            prop_assert_eq!(envelope.idempotency_key(), None);
        }
    }

    /// Confidence construction is total and always lands in [0, 1].
    #[test]
    fn confidence_always_in_unit_interval(value in prop::num::f64::ANY) {
        let confidence = Confidence::new(value);
        prop_assert!((0.0..=1.0).contains(&confidence.value()));
    }
}
