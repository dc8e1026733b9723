//! The NarrativeSpine facade: construction wiring plus the external
//! interfaces collaborating services consume.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::broadcast;

use spine_coherence::{CoherenceEngine, CoherenceScorer, HttpOracle};
use spine_context::StoryContextCache;
use spine_core::config::SpineConfig;
use spine_core::errors::SpineResult;
use spine_core::event::{EventEnvelope, IngestAck, StoryEvent};
use spine_core::models::{CoherenceAlert, CoherenceScore, DeadLetter, NarrativeContext};
use spine_core::traits::{IGraphStore, IScoringOracle};
use spine_store::StoreEngine;

use crate::alerts::AlertBus;
use crate::gateway::IngestGateway;
use crate::sequencer::Sequencer;

/// The assembled Narrative Spine.
///
/// Construction wires store, engine, scorer, cache, sequencer, and
/// gateway together and spawns the cache invalidation listener, so it
/// must run inside a Tokio runtime. Call [`NarrativeSpine::recover`]
/// once after construction to replay any intake entries a previous
/// process acknowledged but never finished.
pub struct NarrativeSpine {
    store: Arc<StoreEngine>,
    gateway: IngestGateway,
    sequencer: Sequencer,
    cache: Arc<StoryContextCache>,
    scorer: Arc<CoherenceScorer>,
    alerts: AlertBus,
}

impl NarrativeSpine {
    /// Assemble a spine with the given oracle implementation.
    pub fn new(config: SpineConfig, oracle: Arc<dyn IScoringOracle>) -> SpineResult<Self> {
        config.validate()?;

        let store = if config.store.db_path.is_empty() {
            Arc::new(StoreEngine::open_in_memory()?)
        } else {
            Arc::new(StoreEngine::open(
                Path::new(&config.store.db_path),
                config.store.read_pool_size,
            )?)
        };

        let graph_store: Arc<dyn IGraphStore> = store.clone();
        let engine = Arc::new(CoherenceEngine::new(
            graph_store.clone(),
            oracle,
            config.coherence.clone(),
            config.revision.clone(),
        ));
        let scorer = Arc::new(CoherenceScorer::new(config.scorer.clone()));

        let cache = Arc::new(StoryContextCache::new(
            config.cache.clone(),
            graph_store,
            scorer.clone(),
        ));
        cache.spawn_invalidation_listener(store.subscribe_invalidations());

        let alerts = AlertBus::new();
        let sequencer = Sequencer::new(
            config.sequencer.clone(),
            store.clone(),
            engine,
            scorer.clone(),
            alerts.clone(),
        );
        let gateway = IngestGateway::new(config.intake.clone(), store.clone(), sequencer.clone());

        Ok(Self {
            store,
            gateway,
            sequencer,
            cache,
            scorer,
            alerts,
        })
    }

    /// Assemble with the production HTTP oracle from config.
    pub fn with_http_oracle(config: SpineConfig) -> SpineResult<Self> {
        let oracle = Arc::new(HttpOracle::new(&config.coherence)?);
        Self::new(config, oracle)
    }

    /// Replay intake entries acknowledged before a crash. Returns the
    /// number of events re-entered into lanes.
    pub async fn recover(&self) -> SpineResult<usize> {
        self.sequencer.replay_pending().await
    }

    // ── External interfaces ──

    /// Inbound event-bus surface.
    pub async fn ingest(&self, envelope: EventEnvelope) -> SpineResult<IngestAck> {
        self.gateway.ingest(envelope).await
    }

    /// Context read API: cached summary + score + freshness token.
    pub fn narrative_context(&self, agent_id: &str) -> SpineResult<NarrativeContext> {
        self.cache.get(agent_id)
    }

    /// Read-your-writes context read: pass the ack's
    /// `graph_version_floor` as `min_version`.
    pub async fn narrative_context_at_least(
        &self,
        agent_id: &str,
        min_version: u64,
    ) -> SpineResult<NarrativeContext> {
        self.cache.get_at_least(agent_id, min_version).await
    }

    /// Admin/audit read: the full story including superseded,
    /// retracted, and needs-review nodes.
    pub fn full_history(&self, agent_id: &str) -> SpineResult<Vec<StoryEvent>> {
        self.store.full_history(agent_id)
    }

    /// The transitive causal ancestry of one event.
    pub fn causal_ancestors(&self, event_id: &str) -> SpineResult<Vec<StoryEvent>> {
        let event = self.store.get_event(event_id)?.ok_or_else(|| {
            spine_core::errors::StoreError::NotFound(event_id.to_string())
        })?;
        let graph = spine_graph::hydrate(self.store.as_ref(), &event.agent_id)?;
        let ids = spine_graph::traversal::causal_ancestors(&graph, event_id);
        self.store.events_by_ids(&ids)
    }

    /// Audit: pairs of Active nodes still joined by a Contradicts
    /// edge. Empty whenever belief revision is doing its job.
    pub fn verify_coherence(&self, agent_id: &str) -> SpineResult<Vec<(String, String)>> {
        let graph = spine_graph::hydrate(self.store.as_ref(), agent_id)?;
        Ok(spine_graph::exclusivity::violations(&graph))
    }

    pub fn coherence_score(&self, agent_id: &str) -> SpineResult<CoherenceScore> {
        self.scorer.current(self.store.as_ref(), agent_id)
    }

    pub fn graph_version(&self, agent_id: &str) -> SpineResult<u64> {
        self.store.graph_version(agent_id)
    }

    /// Coherence alert channel for monitoring collaborators.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<CoherenceAlert> {
        self.alerts.subscribe()
    }

    // ── Dead-letter administration ──

    pub fn dead_letters(&self, agent_id: &str) -> SpineResult<Vec<DeadLetter>> {
        self.store.dead_letters(agent_id)
    }

    /// Replay a parked event and resume its agent's halted lane.
    pub async fn replay_dead_letter(&self, id: i64) -> SpineResult<String> {
        self.sequencer.replay_dead_letter(id).await
    }

    /// Direct store access for audit tooling and tests.
    pub fn store(&self) -> &Arc<StoreEngine> {
        &self.store
    }
}
