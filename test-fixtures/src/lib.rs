//! Shared builders and a scripted oracle for integration tests across
//! the spine crates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use spine_core::errors::{OracleError, SpineResult};
use spine_core::event::{EventEnvelope, EventType, StoryEvent};
use spine_core::models::{ContradictionAxis, OracleFinding};
use spine_core::traits::IScoringOracle;

/// A fixed base instant so tests get reproducible timestamps.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap()
}

/// Builder for event envelopes with sensible test defaults.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    envelope: EventEnvelope,
}

impl EnvelopeBuilder {
    pub fn new(agent_id: &str, content: &str) -> Self {
        Self {
            envelope: EventEnvelope {
                agent_id: agent_id.to_string(),
                event_type: EventType::KnowledgeAcquired,
                content: content.to_string(),
                source_service: "test-service".to_string(),
                local_reference: None,
                confidence: 0.8,
                timestamp: base_time(),
                causal_parents: vec![],
            },
        }
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.envelope.event_type = event_type;
        self
    }

    pub fn source(mut self, source_service: &str) -> Self {
        self.envelope.source_service = source_service.to_string();
        self
    }

    pub fn local_reference(mut self, local_reference: &str) -> Self {
        self.envelope.local_reference = Some(local_reference.to_string());
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.envelope.confidence = confidence;
        self
    }

    /// Timestamp offset in seconds from the fixed base instant.
    pub fn at_offset_secs(mut self, secs: i64) -> Self {
        self.envelope.timestamp = base_time() + chrono::Duration::seconds(secs);
        self
    }

    pub fn parents(mut self, parents: &[&str]) -> Self {
        self.envelope.causal_parents = parents.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn build(self) -> EventEnvelope {
        self.envelope
    }
}

/// A committed StoryEvent with a fresh UUID, for store-level tests that
/// bypass the gateway.
pub fn story_event(agent_id: &str, content: &str, intake_seq: i64) -> StoryEvent {
    let envelope = EnvelopeBuilder::new(agent_id, content).build();
    StoryEvent::from_envelope(&envelope, uuid::Uuid::new_v4().to_string(), intake_seq)
}

/// Deterministic oracle scripted per statement content.
///
/// `flag(new_content, existing_content, axis, confidence)` registers a
/// contradiction; anything unscripted scores clean. Also counts calls
/// and can be told to fail the next N calls, for retry-path tests.
pub struct ScriptedOracle {
    rules: Mutex<HashMap<String, Vec<(String, ContradictionAxis, f64)>>>,
    calls: AtomicUsize,
    fail_next: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            fail_next: AtomicUsize::new(0),
        }
    }

    pub fn flag(&self, new_content: &str, existing: &str, axis: ContradictionAxis, conf: f64) {
        self.rules
            .lock()
            .unwrap()
            .entry(new_content.to_string())
            .or_default()
            .push((existing.to_string(), axis, conf));
    }

    /// Make the next `n` score calls fail with `OracleError::Unavailable`.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IScoringOracle for ScriptedOracle {
    async fn score(
        &self,
        new_statement: &str,
        candidates: &[String],
    ) -> SpineResult<Vec<OracleFinding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(OracleError::Unavailable("scripted failure".to_string()).into());
        }

        let rules = self.rules.lock().unwrap();
        let mut findings = Vec::new();
        if let Some(flagged) = rules.get(new_statement) {
            for (existing, axis, confidence) in flagged {
                if let Some(index) = candidates.iter().position(|c| c == existing) {
                    findings.push(OracleFinding {
                        index,
                        axis: *axis,
                        confidence: *confidence,
                    });
                }
            }
        }
        Ok(findings)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
