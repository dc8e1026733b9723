//! One revision round: tie-break, supersession, and the list of
//! dependents needing re-evaluation.

use std::cmp::Ordering;

use tracing::{debug, info};

use spine_core::errors::SpineResult;
use spine_core::event::{EventStatus, StoryEvent};
use spine_core::models::Revision;
use spine_core::traits::IGraphStore;
use spine_graph::traversal::active_descendant_count;
use spine_graph::IndexedGraph;

use crate::cascade::children_losing_sole_support;

/// Result of a single revision round.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// The event that survived this round's tie-break.
    pub winner_id: String,
    /// Events transitioned to Superseded this round.
    pub superseded: Vec<String>,
    /// Status transitions applied, for the resolution record.
    pub revisions: Vec<Revision>,
    /// Active dependents that lost their sole support and must be
    /// re-queued through the coherence engine.
    pub reevaluate: Vec<String>,
}

/// The belief-revision resolver. Stateless; configuration lives with
/// the engine driving the cascade.
pub struct RevisionResolver;

impl RevisionResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve one contradiction set: the new event against the
    /// existing events the oracle flagged.
    ///
    /// Pairwise, at most one of (new, existing) may stay Active. If the
    /// new event beats every flagged existing event, they are all
    /// superseded by it. Otherwise the new event is superseded by the
    /// strongest existing event that beats it and the flagged existing
    /// events stay Active — a Contradicts edge to a non-Active node
    /// violates nothing.
    pub fn resolve_round(
        &self,
        store: &dyn IGraphStore,
        graph: &mut IndexedGraph,
        new_event: &StoryEvent,
        contradicted: &[StoryEvent],
    ) -> SpineResult<RoundOutcome> {
        // Strongest flagged event that beats the new one, if any.
        let strongest_existing = contradicted
            .iter()
            .filter(|existing| compare_priority(existing, new_event, graph) == Ordering::Greater)
            .max_by(|a, b| compare_priority(a, b, graph));

        let mut outcome = match strongest_existing {
            None => {
                // New event wins every pair: supersede all flagged events.
                let mut superseded = Vec::new();
                let mut revisions = Vec::new();
                for existing in contradicted {
                    let revision = supersede(store, graph, existing, &new_event.event_id)?;
                    superseded.push(existing.event_id.clone());
                    revisions.push(revision);
                }
                RoundOutcome {
                    winner_id: new_event.event_id.clone(),
                    superseded,
                    revisions,
                    reevaluate: Vec::new(),
                }
            }
            Some(winner) => {
                // An existing event takes the round; the new event is
                // superseded once.
                let revision = supersede(store, graph, new_event, &winner.event_id)?;
                RoundOutcome {
                    winner_id: winner.event_id.clone(),
                    superseded: vec![new_event.event_id.clone()],
                    revisions: vec![revision],
                    reevaluate: Vec::new(),
                }
            }
        };

        // Dependents of anything superseded this round may have lost
        // their sole support.
        for superseded_id in outcome.superseded.clone() {
            let orphaned = children_losing_sole_support(graph, &superseded_id);
            for child in orphaned {
                if !outcome.reevaluate.contains(&child) {
                    outcome.reevaluate.push(child);
                }
            }
        }

        info!(
            winner = %outcome.winner_id,
            superseded = outcome.superseded.len(),
            reevaluate = outcome.reevaluate.len(),
            "revision round complete"
        );
        Ok(outcome)
    }

    /// Park an event in NeedsReview (cascade depth exhausted).
    pub fn flag_for_review(
        &self,
        store: &dyn IGraphStore,
        graph: &mut IndexedGraph,
        event: &StoryEvent,
        reason: &str,
    ) -> SpineResult<Revision> {
        store.mark_status(&event.event_id, EventStatus::NeedsReview, None, reason)?;
        graph.set_status(&event.event_id, EventStatus::NeedsReview);
        debug!(event_id = %event.event_id, reason, "flagged for review");
        Ok(Revision {
            event_id: event.event_id.clone(),
            from_status: event.status,
            to_status: EventStatus::NeedsReview,
            reason: reason.to_string(),
        })
    }
}

impl Default for RevisionResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// The documented tie-break, as a total order:
/// 1. higher confidence wins;
/// 2. then more recent publisher timestamp;
/// 3. then more Active causal descendants (minimizing cascade size);
/// 4. then the lexicographically larger event_id, so the order is
///    total and the resolver can never report a draw.
pub fn compare_priority(a: &StoryEvent, b: &StoryEvent, graph: &IndexedGraph) -> Ordering {
    a.confidence
        .value()
        .partial_cmp(&b.confidence.value())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.timestamp.cmp(&b.timestamp))
        .then_with(|| {
            active_descendant_count(graph, &a.event_id)
                .cmp(&active_descendant_count(graph, &b.event_id))
        })
        .then_with(|| a.event_id.cmp(&b.event_id))
}

/// Apply one supersession to store and graph.
fn supersede(
    store: &dyn IGraphStore,
    graph: &mut IndexedGraph,
    loser: &StoryEvent,
    winner_id: &str,
) -> SpineResult<Revision> {
    store.mark_status(
        &loser.event_id,
        EventStatus::Superseded,
        Some(winner_id),
        "lost belief-revision tie-break",
    )?;
    graph.set_status(&loser.event_id, EventStatus::Superseded);
    Ok(Revision {
        event_id: loser.event_id.clone(),
        from_status: loser.status,
        to_status: EventStatus::Superseded,
        reason: format!("superseded by {winner_id}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::story_event;

    #[test]
    fn higher_confidence_wins() {
        let graph = IndexedGraph::new();
        let mut a = story_event("a1", "budget is $500", 1);
        a.confidence = 0.7.into();
        let mut b = story_event("a1", "budget is $1000", 2);
        b.confidence = 0.9.into();
        assert_eq!(compare_priority(&b, &a, &graph), Ordering::Greater);
    }

    #[test]
    fn recency_breaks_confidence_tie() {
        let graph = IndexedGraph::new();
        let mut a = story_event("a1", "x", 1);
        a.confidence = 0.8.into();
        let mut b = story_event("a1", "y", 2);
        b.confidence = 0.8.into();
        b.timestamp = a.timestamp + chrono::Duration::seconds(60);
        assert_eq!(compare_priority(&b, &a, &graph), Ordering::Greater);
    }

    #[test]
    fn event_id_makes_order_total() {
        let graph = IndexedGraph::new();
        let mut a = story_event("a1", "x", 1);
        let mut b = story_event("a1", "y", 2);
        a.confidence = 0.8.into();
        b.confidence = 0.8.into();
        b.timestamp = a.timestamp;
        let ord = compare_priority(&a, &b, &graph);
        assert_ne!(ord, Ordering::Equal);
        assert_eq!(ord, compare_priority(&b, &a, &graph).reverse());
    }
}
