//! Deterministic lexical oracle. Used as the test stand-in for the LLM
//! scorer and as a no-network fallback. Three detection passes:
//! absolute-statement conflicts, direct negation, and value
//! reassignment on a shared subject.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use spine_core::errors::SpineResult;
use spine_core::models::{ContradictionAxis, OracleFinding};
use spine_core::traits::IScoringOracle;

/// Absolute positive statements.
static ALWAYS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(always|must always|every time|without exception|in all cases)\b")
        .unwrap()
});

/// Absolute negative statements.
static NEVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(never|must never|under no circumstances|in no case)\b")
        .unwrap()
});

/// Negation markers for the direct-negation pass.
static NEGATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(not|no longer|isn't|aren't|wasn't|doesn't|didn't|cannot|can't)\b")
        .unwrap()
});

/// "subject is/was/equals/costs value" assignments.
static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(.{2,80}?)\s+(?:is|was|equals|costs|=)\s+(.+?)\s*$").unwrap()
});

/// Lexical cues for axis classification.
static GOAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(goal|wants?|plans?|intends?|aims?)\b").unwrap());
static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(did|executed|deployed|performed|ran|completed)\b").unwrap()
});
static BELIEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(believes?|thinks?|assumes?|expects?)\b").unwrap());

/// Rule-based oracle. Stateless and deterministic.
pub struct RuleOracle;

impl RuleOracle {
    pub fn new() -> Self {
        Self
    }

    fn check_pair(new_statement: &str, candidate: &str) -> Option<(ContradictionAxis, f64)> {
        if let Some(confidence) = absolute_conflict(new_statement, candidate) {
            return Some((classify_axis(new_statement), confidence));
        }
        if let Some(confidence) = negation_conflict(new_statement, candidate) {
            return Some((classify_axis(new_statement), confidence));
        }
        if let Some(confidence) = assignment_conflict(new_statement, candidate) {
            return Some((ContradictionAxis::Fact, confidence));
        }
        None
    }
}

impl Default for RuleOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IScoringOracle for RuleOracle {
    async fn score(
        &self,
        new_statement: &str,
        candidates: &[String],
    ) -> SpineResult<Vec<OracleFinding>> {
        let findings = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                Self::check_pair(new_statement, candidate)
                    .map(|(axis, confidence)| OracleFinding {
                        index,
                        axis,
                        confidence,
                    })
            })
            .collect();
        Ok(findings)
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}

/// "Always X" vs "never X" on overlapping topics.
fn absolute_conflict(a: &str, b: &str) -> Option<f64> {
    let pair = if let (Some(m1), Some(m2)) = (ALWAYS_RE.find(a), NEVER_RE.find(b)) {
        Some((extract_topic(a, m1.end()), extract_topic(b, m2.end())))
    } else if let (Some(m1), Some(m2)) = (NEVER_RE.find(a), ALWAYS_RE.find(b)) {
        Some((extract_topic(a, m1.end()), extract_topic(b, m2.end())))
    } else {
        None
    };
    let (topic_a, topic_b) = pair?;
    topics_overlap(&topic_a, &topic_b).then_some(0.85)
}

/// One statement is (nearly) the other plus a negation marker.
fn negation_conflict(a: &str, b: &str) -> Option<f64> {
    let a_negated = NEGATION_RE.is_match(a);
    let b_negated = NEGATION_RE.is_match(b);
    if a_negated == b_negated {
        return None;
    }
    let stripped_a = NEGATION_RE.replace_all(a, "");
    let stripped_b = NEGATION_RE.replace_all(b, "");
    topics_overlap(&stripped_a.to_lowercase(), &stripped_b.to_lowercase()).then_some(0.8)
}

/// Same subject assigned different values.
fn assignment_conflict(a: &str, b: &str) -> Option<f64> {
    let cap_a = ASSIGNMENT_RE.captures(a)?;
    let cap_b = ASSIGNMENT_RE.captures(b)?;
    let subject_a = cap_a.get(1)?.as_str().trim().to_lowercase();
    let subject_b = cap_b.get(1)?.as_str().trim().to_lowercase();
    let value_a = cap_a.get(2)?.as_str().trim().to_lowercase();
    let value_b = cap_b.get(2)?.as_str().trim().to_lowercase();
    (subject_a == subject_b && value_a != value_b).then_some(0.8)
}

fn classify_axis(statement: &str) -> ContradictionAxis {
    if GOAL_RE.is_match(statement) {
        ContradictionAxis::Goal
    } else if ACTION_RE.is_match(statement) {
        ContradictionAxis::Action
    } else if BELIEF_RE.is_match(statement) {
        ContradictionAxis::Belief
    } else {
        ContradictionAxis::Fact
    }
}

/// Lowercased snippet after an absolute keyword, for topic comparison.
fn extract_topic(text: &str, start: usize) -> String {
    text[start..].chars().take(60).collect::<String>().trim().to_lowercase()
}

/// At least 30% word overlap between the shorter topic and the other.
fn topics_overlap(a: &str, b: &str) -> bool {
    let a_words: Vec<&str> = a.split_whitespace().filter(|w| w.len() > 2).collect();
    let b_words: Vec<&str> = b.split_whitespace().filter(|w| w.len() > 2).collect();
    if a_words.is_empty() || b_words.is_empty() {
        return false;
    }
    let overlap = a_words.iter().filter(|w| b_words.contains(w)).count();
    let min_len = a_words.len().min(b_words.len());
    overlap as f64 / min_len as f64 >= 0.3
}
