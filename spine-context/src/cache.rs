//! moka-backed context cache with version-stamped entries.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use moka::sync::Cache;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use spine_coherence::CoherenceScorer;
use spine_core::config::CacheConfig;
use spine_core::errors::SpineResult;
use spine_core::models::NarrativeContext;
use spine_core::traits::IGraphStore;
use spine_store::Invalidation;

use crate::summary::build_summary;

/// Polling interval while waiting in a read-your-writes read.
const RETRY_INTERVAL_MS: u64 = 20;

/// Version-stamped context cache, one entry per agent.
pub struct StoryContextCache {
    config: CacheConfig,
    store: Arc<dyn IGraphStore>,
    scorer: Arc<CoherenceScorer>,
    entries: Cache<String, NarrativeContext>,
    /// Highest graph version seen per agent via invalidation signals.
    /// An entry older than this is stale regardless of TTL. Shared
    /// with the invalidation listener task.
    latest_versions: Arc<DashMap<String, u64>>,
}

impl StoryContextCache {
    pub fn new(
        config: CacheConfig,
        store: Arc<dyn IGraphStore>,
        scorer: Arc<CoherenceScorer>,
    ) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();
        Self {
            config,
            store,
            scorer,
            entries,
            latest_versions: Arc::new(DashMap::new()),
        }
    }

    /// Consume invalidation signals from the store. Marking is cheap:
    /// just the version watermark moves; recompute stays lazy.
    pub fn spawn_invalidation_listener(
        &self,
        mut receiver: broadcast::Receiver<Invalidation>,
    ) -> JoinHandle<()> {
        let versions = Arc::clone(&self.latest_versions);
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(signal) => {
                        advance_watermark(&versions, &signal.agent_id, signal.graph_version)
                    }
                    // Lagging just means we missed some watermarks; the
                    // next signal or the TTL covers it.
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "invalidation listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Record a known graph version for an agent.
    pub fn note_version(&self, agent_id: &str, graph_version: u64) {
        advance_watermark(&self.latest_versions, agent_id, graph_version);
    }

    /// Get the agent's context, recomputing if missing or stale.
    pub fn get(&self, agent_id: &str) -> SpineResult<NarrativeContext> {
        let watermark = self
            .latest_versions
            .get(agent_id)
            .map(|v| *v)
            .unwrap_or(0);

        if let Some(entry) = self.entries.get(agent_id) {
            if entry.graph_version >= watermark {
                return Ok(entry);
            }
            trace!(agent_id, entry_version = entry.graph_version, watermark, "stale entry");
        }

        self.recompute(agent_id)
    }

    /// Read-your-writes: wait (bounded) until the cache can serve a
    /// context at least as fresh as `min_version`, then fall back to a
    /// direct recompute from the store.
    pub async fn get_at_least(
        &self,
        agent_id: &str,
        min_version: u64,
    ) -> SpineResult<NarrativeContext> {
        let deadline =
            tokio::time::Instant::now() + Duration::from_millis(self.config.read_your_writes_wait_ms);

        loop {
            let context = self.get(agent_id)?;
            if context.graph_version >= min_version {
                return Ok(context);
            }
            if tokio::time::Instant::now() >= deadline {
                // Bounded wait exhausted: serve the store's truth
                // directly. The store is authoritative even when the
                // invalidation signal that would have bumped the
                // watermark was lost.
                return self.recompute(agent_id);
            }
            tokio::time::sleep(Duration::from_millis(RETRY_INTERVAL_MS)).await;
        }
    }

    /// Rebuild and store the entry.
    ///
    /// The version is read before the window query: a concurrent
    /// mutation in between yields an entry stamped older than its
    /// content, which only causes one extra recompute, never a
    /// fresher-than-reality stamp.
    fn recompute(&self, agent_id: &str) -> SpineResult<NarrativeContext> {
        let graph_version = self.store.graph_version(agent_id)?;
        let summary = build_summary(
            self.store.as_ref(),
            agent_id,
            self.config.summary_statements,
        )?;
        let score = self.scorer.current(self.store.as_ref(), agent_id)?;

        let context = NarrativeContext {
            agent_id: agent_id.to_string(),
            summary,
            coherence_score: score.value,
            graph_version,
        };
        self.entries.insert(agent_id.to_string(), context.clone());
        self.note_version(agent_id, graph_version);
        debug!(agent_id, graph_version, "context recomputed");
        Ok(context)
    }

    /// Number of live cache entries.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raise an agent's version watermark; never moves it backwards.
fn advance_watermark(versions: &DashMap<String, u64>, agent_id: &str, graph_version: u64) {
    let mut entry = versions.entry(agent_id.to_string()).or_insert(0);
    if *entry < graph_version {
        *entry = graph_version;
    }
    trace!(agent_id, graph_version, "cache watermark advanced");
}
