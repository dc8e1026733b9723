//! CoherenceEngine: evaluates each sequenced event against the recent
//! window, commits it, and drives belief revision to completion before
//! returning. One invocation per event, always from the owning agent's
//! lane, so everything here is single-writer per agent.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use spine_core::config::{CoherenceConfig, RevisionConfig};
use spine_core::errors::{GraphError, OracleError, SpineResult};
use spine_core::event::{EventStatus, StoryEvent};
use spine_core::models::{
    CommitOutcome, ContradictionFinding, EdgeKind, IngestionOutcome, OracleFinding, Resolution,
};
use spine_core::traits::{IGraphStore, IScoringOracle};
use spine_graph::exclusivity;
use spine_graph::graph::cycle::would_create_cycle;
use spine_graph::{hydrate, IndexedGraph, NarrativeEdgeWeight};
use spine_revision::RevisionResolver;

/// The coherence engine. Shared across lanes behind an Arc.
pub struct CoherenceEngine {
    store: Arc<dyn IGraphStore>,
    oracle: Arc<dyn IScoringOracle>,
    resolver: RevisionResolver,
    config: CoherenceConfig,
    revision: RevisionConfig,
}

impl CoherenceEngine {
    pub fn new(
        store: Arc<dyn IGraphStore>,
        oracle: Arc<dyn IScoringOracle>,
        config: CoherenceConfig,
        revision: RevisionConfig,
    ) -> Self {
        Self {
            store,
            oracle,
            resolver: RevisionResolver::new(),
            config,
            revision,
        }
    }

    /// Evaluate one event and commit it, resolving any actionable
    /// contradiction synchronously. Errors out of here are classified
    /// by the lane into retry/dead-letter handling; nothing is
    /// partially lost because the intake log entry stays unprocessed
    /// until the lane marks it.
    pub async fn evaluate_and_commit(&self, event: &StoryEvent) -> SpineResult<CommitOutcome> {
        let window = self.window_for(event)?;
        let actionable = self.score_against_window(event, &window).await?;

        // Commit the node. A replay after a crash between commit and
        // intake-log marking finds the node already present; skipping
        // the append keeps replays idempotent.
        if self.store.get_event(&event.event_id)?.is_none() {
            self.store.append_node(event)?;
        }

        let mut graph = hydrate(self.store.as_ref(), &event.agent_id)?;
        self.link_causal_parents(event, &mut graph)?;

        let contradictions: Vec<ContradictionFinding> = actionable
            .iter()
            .map(|(existing, finding)| ContradictionFinding {
                event_id: existing.event_id.clone(),
                axis: finding.axis,
                confidence: finding.confidence,
            })
            .collect();

        let resolution = if actionable.is_empty() {
            None
        } else {
            let flagged: Vec<StoryEvent> =
                actionable.iter().map(|(event, _)| (*event).clone()).collect();
            self.mark_contradictions(event, &flagged, &mut graph)?;
            Some(self.resolve_cascade(event, flagged, &mut graph).await?)
        };

        // The invariant the whole subsystem exists to enforce. Any hit
        // here is a resolver bug, not an expected runtime state.
        let violations = exclusivity::violations(&graph);
        if !violations.is_empty() {
            warn!(
                agent_id = %event.agent_id,
                ?violations,
                "narrative exclusivity violated after resolution"
            );
        }

        let outcome = match &resolution {
            None => IngestionOutcome::Clean,
            Some(r) if r.fully_resolved() => IngestionOutcome::Resolved,
            Some(_) => IngestionOutcome::NeedsReview,
        };

        let graph_version = self.store.graph_version(&event.agent_id)?;
        info!(
            agent_id = %event.agent_id,
            event_id = %event.event_id,
            ?outcome,
            contradictions = contradictions.len(),
            graph_version,
            "event committed"
        );

        Ok(CommitOutcome {
            event_id: event.event_id.clone(),
            agent_id: event.agent_id.clone(),
            graph_version,
            contradictions,
            resolution,
            outcome,
        })
    }

    /// The evaluation window: last K Active events plus any Active
    /// event explicitly named in causal_parents, excluding the event
    /// under evaluation (present on replays).
    fn window_for(&self, event: &StoryEvent) -> SpineResult<Vec<StoryEvent>> {
        let mut window =
            self.store
                .recent_window(&event.agent_id, self.config.window_size, false)?;
        window.retain(|e| e.event_id != event.event_id);
        for parent in self.store.events_by_ids(&event.causal_parents)? {
            if parent.status.is_active()
                && parent.agent_id == event.agent_id
                && !window.iter().any(|w| w.event_id == parent.event_id)
            {
                window.push(parent);
            }
        }
        Ok(window)
    }

    /// Oracle call under timeout, then the actionability filter.
    /// Returns (window event, finding) pairs that passed the threshold.
    async fn score_against_window<'a>(
        &self,
        event: &StoryEvent,
        window: &'a [StoryEvent],
    ) -> SpineResult<Vec<(&'a StoryEvent, OracleFinding)>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let candidates: Vec<String> = window.iter().map(|e| e.content.clone()).collect();
        let timeout = Duration::from_secs(self.config.oracle_timeout_secs);
        let findings = match tokio::time::timeout(
            timeout,
            self.oracle.score(&event.content, &candidates),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(OracleError::Timeout {
                    elapsed_ms: timeout.as_millis() as u64,
                }
                .into())
            }
        };

        let mut actionable = Vec::new();
        for finding in findings {
            let Some(existing) = window.get(finding.index) else {
                return Err(OracleError::MalformedResponse(format!(
                    "index {} out of range for window of {}",
                    finding.index,
                    window.len()
                ))
                .into());
            };
            if finding.confidence >= self.config.actionability_threshold {
                actionable.push((existing, finding));
            } else {
                // Sub-threshold signals are noise until proven
                // otherwise; log and move on.
                debug!(
                    event_id = %event.event_id,
                    existing = %existing.event_id,
                    confidence = finding.confidence,
                    threshold = self.config.actionability_threshold,
                    "sub-threshold contradiction signal ignored"
                );
            }
        }
        Ok(actionable)
    }

    /// Link declared causal parents: Active parent plain, non-Active
    /// parent flagged weakened. Parents must exist and belong to the
    /// same agent; the graph is per agent.
    fn link_causal_parents(
        &self,
        event: &StoryEvent,
        graph: &mut IndexedGraph,
    ) -> SpineResult<()> {
        for parent_id in &event.causal_parents {
            let parent = self
                .store
                .get_event(parent_id)?
                .filter(|p| p.agent_id == event.agent_id)
                .ok_or_else(|| GraphError::UnknownNode(parent_id.clone()))?;

            let (Some(from), Some(to)) =
                (graph.get_node(parent_id), graph.get_node(&event.event_id))
            else {
                return Err(GraphError::UnknownNode(parent_id.clone()).into());
            };
            if would_create_cycle(graph, from, to) {
                return Err(GraphError::CycleRejected {
                    from: parent_id.clone(),
                    to: event.event_id.clone(),
                }
                .into());
            }

            let weakened = !parent.status.is_active();
            self.store
                .add_edge(parent_id, &event.event_id, EdgeKind::Causal, weakened)?;
            graph.add_edge(
                from,
                to,
                NarrativeEdgeWeight {
                    kind: EdgeKind::Causal,
                    weakened,
                },
            );
        }
        Ok(())
    }

    /// Record Contradicts edges for every actionable finding.
    fn mark_contradictions(
        &self,
        event: &StoryEvent,
        flagged: &[StoryEvent],
        graph: &mut IndexedGraph,
    ) -> SpineResult<()> {
        for existing in flagged {
            self.store.add_edge(
                &event.event_id,
                &existing.event_id,
                EdgeKind::Contradicts,
                false,
            )?;
            if let (Some(from), Some(to)) = (
                graph.get_node(&event.event_id),
                graph.get_node(&existing.event_id),
            ) {
                graph.add_edge(
                    from,
                    to,
                    NarrativeEdgeWeight {
                        kind: EdgeKind::Contradicts,
                        weakened: false,
                    },
                );
            }
        }
        Ok(())
    }

    /// Belief revision as bounded re-queuing. Each queue entry is one
    /// contradiction set; dependents that lose their sole support are
    /// re-scored as if newly submitted and, when they conflict again,
    /// join the queue one level deeper. At the depth bound the chain
    /// is parked for review instead of auto-resolved.
    async fn resolve_cascade(
        &self,
        event: &StoryEvent,
        flagged: Vec<StoryEvent>,
        graph: &mut IndexedGraph,
    ) -> SpineResult<Resolution> {
        let mut resolution = Resolution {
            winner_id: String::new(),
            superseded: Vec::new(),
            revisions: Vec::new(),
            needs_review: Vec::new(),
            depth_reached: 0,
        };

        let mut queue: VecDeque<(StoryEvent, Vec<StoryEvent>, usize)> = VecDeque::new();
        queue.push_back((event.clone(), flagged, 0));

        while let Some((subject, contradicted, depth)) = queue.pop_front() {
            // An earlier round of a branching cascade may have already
            // displaced this subject.
            if depth > 0 {
                match self.store.get_event(&subject.event_id)? {
                    Some(current) if current.status == EventStatus::Active => {}
                    _ => continue,
                }
            }
            if depth >= self.revision.max_cascade_depth {
                let revision = self.resolver.flag_for_review(
                    self.store.as_ref(),
                    graph,
                    &subject,
                    "cascade depth exceeded",
                )?;
                resolution.needs_review.push(subject.event_id.clone());
                resolution.revisions.push(revision);
                continue;
            }
            resolution.depth_reached = resolution.depth_reached.max(depth);

            let round =
                self.resolver
                    .resolve_round(self.store.as_ref(), graph, &subject, &contradicted)?;
            if resolution.winner_id.is_empty() {
                resolution.winner_id = round.winner_id.clone();
            }
            resolution.superseded.extend(round.superseded.iter().cloned());
            resolution.revisions.extend(round.revisions.clone());

            for child_id in round.reevaluate {
                let Some(child) = self.store.get_event(&child_id)? else {
                    continue;
                };
                if child.status != EventStatus::Active {
                    continue;
                }
                let child_window = self.window_for(&child)?;
                let child_actionable = self.score_against_window(&child, &child_window).await?;
                if child_actionable.is_empty() {
                    // Still consistent with the current story; it
                    // keeps its (weakened) place.
                    continue;
                }
                let child_flagged: Vec<StoryEvent> = child_actionable
                    .iter()
                    .map(|(event, _)| (*event).clone())
                    .collect();
                self.mark_contradictions(&child, &child_flagged, graph)?;
                queue.push_back((child, child_flagged, depth + 1));
            }
        }

        Ok(resolution)
    }
}
