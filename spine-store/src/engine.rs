//! StoreEngine: owns the connection pool, implements IGraphStore, and
//! emits invalidation signals on every graph mutation.

use std::path::Path;

use tokio::sync::broadcast;
use tracing::debug;

use spine_core::errors::SpineResult;
use spine_core::event::{EventEnvelope, EventStatus, StoryEvent};
use spine_core::models::{CoherenceScore, DeadLetter, EdgeKind, EdgeRecord};
use spine_core::traits::IGraphStore;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{
    audit_ops, dead_letter_ops, edge_ops, intake_ops, node_ops, score_ops, version_ops,
};
use crate::to_store_err;

/// Capacity of the invalidation broadcast channel. A lagging cache
/// falls back to its TTL, so losing old signals is tolerable.
const INVALIDATION_CHANNEL_CAPACITY: usize = 1024;

/// Sent to subscribers after every committed graph mutation.
#[derive(Debug, Clone)]
pub struct Invalidation {
    pub agent_id: String,
    pub graph_version: u64,
}

/// The main storage engine. One per spine process.
pub struct StoreEngine {
    pool: ConnectionPool,
    /// File-backed databases read through the pool; in-memory ones
    /// route reads through the writer (pool connections are isolated).
    use_read_pool: bool,
    invalidations: broadcast::Sender<Invalidation>,
}

impl StoreEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path, read_pool_size: usize) -> SpineResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        let (invalidations, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        let engine = Self {
            pool,
            use_read_pool: true,
            invalidations,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> SpineResult<Self> {
        let pool = ConnectionPool::open_in_memory(1)?;
        let (invalidations, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        let engine = Self {
            pool,
            use_read_pool: false,
            invalidations,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> SpineResult<()> {
        self.pool
            .writer
            .with_conn(|conn| migrations::run_migrations(conn))
    }

    /// Subscribe to graph-mutation invalidation signals.
    pub fn subscribe_invalidations(&self) -> broadcast::Receiver<Invalidation> {
        self.invalidations.subscribe()
    }

    fn notify(&self, agent_id: &str, graph_version: u64) {
        // No receivers is fine; the cache TTL covers that window.
        let _ = self.invalidations.send(Invalidation {
            agent_id: agent_id.to_string(),
            graph_version,
        });
    }

    /// Route a read to the pool or the writer depending on backing.
    fn with_reader<F, T>(&self, f: F) -> SpineResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> SpineResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn(f)
        }
    }

    // ── Intake log ──

    /// Durably record an accepted envelope. Returns the assigned (or
    /// previously assigned, when deduplicated) event id and sequence.
    pub fn intake_append(
        &self,
        envelope: &EventEnvelope,
        event_id: &str,
        idempotency_key: Option<&str>,
    ) -> SpineResult<intake_ops::IntakeAppend> {
        self.pool
            .writer
            .with_conn(|conn| intake_ops::append(conn, envelope, event_id, idempotency_key))
    }

    pub fn intake_mark_processed(&self, event_id: &str) -> SpineResult<()> {
        self.pool
            .writer
            .with_conn(|conn| intake_ops::mark_processed(conn, event_id))
    }

    /// Unprocessed intake entries for startup replay, ordered per agent.
    pub fn intake_pending(&self) -> SpineResult<Vec<intake_ops::IntakeRow>> {
        self.with_reader(intake_ops::pending)
    }

    pub fn intake_pending_count(&self, agent_id: &str) -> SpineResult<usize> {
        self.with_reader(|conn| intake_ops::pending_count(conn, agent_id))
    }

    // ── Dead letters ──

    pub fn park_dead_letter(
        &self,
        agent_id: &str,
        event_id: &str,
        error: &str,
        retry_count: u32,
    ) -> SpineResult<i64> {
        self.pool
            .writer
            .with_conn(|conn| dead_letter_ops::park(conn, agent_id, event_id, error, retry_count))
    }

    pub fn dead_letters(&self, agent_id: &str) -> SpineResult<Vec<DeadLetter>> {
        self.with_reader(|conn| dead_letter_ops::for_agent(conn, agent_id))
    }

    pub fn has_parked_dead_letter(&self, agent_id: &str) -> SpineResult<bool> {
        self.with_reader(|conn| dead_letter_ops::has_parked(conn, agent_id))
    }

    /// Mark a dead letter replayed, returning `(agent_id, event_id)`.
    pub fn mark_dead_letter_replayed(&self, id: i64) -> SpineResult<(String, String)> {
        self.pool
            .writer
            .with_conn(|conn| dead_letter_ops::mark_replayed(conn, id))
    }

    // ── Audit ──

    pub fn audit_count(&self, event_id: &str) -> SpineResult<usize> {
        self.with_reader(|conn| audit_ops::count_for_event(conn, event_id))
    }
}

impl IGraphStore for StoreEngine {
    fn append_node(&self, event: &StoryEvent) -> SpineResult<u64> {
        let version = self.pool.writer.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_store_err(format!("append_node begin: {e}")))?;
            node_ops::insert_node(&tx, event)?;
            let version = version_ops::bump(&tx, &event.agent_id)?;
            tx.commit()
                .map_err(|e| to_store_err(format!("append_node commit: {e}")))?;
            Ok(version)
        })?;
        debug!(agent_id = %event.agent_id, event_id = %event.event_id, version, "node appended");
        self.notify(&event.agent_id, version);
        Ok(version)
    }

    fn mark_status(
        &self,
        event_id: &str,
        to_status: EventStatus,
        superseded_by: Option<&str>,
        reason: &str,
    ) -> SpineResult<u64> {
        let (agent_id, version) = self.pool.writer.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_store_err(format!("mark_status begin: {e}")))?;
            let agent_id: String = tx
                .query_row(
                    "SELECT agent_id FROM story_nodes WHERE event_id = ?1",
                    [event_id],
                    |row| row.get(0),
                )
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => spine_core::SpineError::Store(
                        spine_core::errors::StoreError::NotFound(event_id.to_string()),
                    ),
                    other => to_store_err(other.to_string()),
                })?;
            let from_status = node_ops::update_status(&tx, event_id, to_status, superseded_by)?;
            audit_ops::record(&tx, event_id, from_status, to_status, superseded_by, reason)?;
            let version = version_ops::bump(&tx, &agent_id)?;
            tx.commit()
                .map_err(|e| to_store_err(format!("mark_status commit: {e}")))?;
            Ok((agent_id, version))
        })?;
        debug!(%agent_id, %event_id, to_status = to_status.as_str(), version, "status changed");
        self.notify(&agent_id, version);
        Ok(version)
    }

    fn add_edge(
        &self,
        from_id: &str,
        to_id: &str,
        kind: EdgeKind,
        weakened: bool,
    ) -> SpineResult<u64> {
        let (agent_id, version) = self.pool.writer.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_store_err(format!("add_edge begin: {e}")))?;
            let agent_id: String = tx
                .query_row(
                    "SELECT agent_id FROM story_nodes WHERE event_id = ?1",
                    [to_id],
                    |row| row.get(0),
                )
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => spine_core::SpineError::Store(
                        spine_core::errors::StoreError::NotFound(to_id.to_string()),
                    ),
                    other => to_store_err(other.to_string()),
                })?;
            edge_ops::insert_edge(&tx, from_id, to_id, kind, weakened)?;
            let version = version_ops::bump(&tx, &agent_id)?;
            tx.commit()
                .map_err(|e| to_store_err(format!("add_edge commit: {e}")))?;
            Ok((agent_id, version))
        })?;
        self.notify(&agent_id, version);
        Ok(version)
    }

    fn get_event(&self, event_id: &str) -> SpineResult<Option<StoryEvent>> {
        self.with_reader(|conn| node_ops::get_node(conn, event_id))
    }

    fn events_by_ids(&self, ids: &[String]) -> SpineResult<Vec<StoryEvent>> {
        self.with_reader(|conn| node_ops::nodes_by_ids(conn, ids))
    }

    fn recent_window(
        &self,
        agent_id: &str,
        n: usize,
        include_inactive: bool,
    ) -> SpineResult<Vec<StoryEvent>> {
        self.with_reader(|conn| node_ops::recent_window(conn, agent_id, n, include_inactive))
    }

    fn edges_for_agent(&self, agent_id: &str) -> SpineResult<Vec<EdgeRecord>> {
        self.with_reader(|conn| edge_ops::edges_for_agent(conn, agent_id))
    }

    fn graph_version(&self, agent_id: &str) -> SpineResult<u64> {
        self.with_reader(|conn| version_ops::current(conn, agent_id))
    }

    fn count_by_status(&self, agent_id: &str, status: EventStatus) -> SpineResult<usize> {
        self.with_reader(|conn| node_ops::count_by_status(conn, agent_id, status))
    }

    fn full_history(&self, agent_id: &str) -> SpineResult<Vec<StoryEvent>> {
        self.with_reader(|conn| node_ops::full_history(conn, agent_id))
    }

    fn load_score(&self, agent_id: &str) -> SpineResult<Option<CoherenceScore>> {
        self.with_reader(|conn| score_ops::get(conn, agent_id))
    }

    fn save_score(&self, score: &CoherenceScore) -> SpineResult<()> {
        self.pool
            .writer
            .with_conn(|conn| score_ops::upsert(conn, score))
    }
}
