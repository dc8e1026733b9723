use crate::errors::SpineResult;
use crate::event::{EventStatus, StoryEvent};
use crate::models::{CoherenceScore, EdgeKind, EdgeRecord};

/// Durable narrative-graph storage.
///
/// Mutations for a given agent are only ever invoked from that agent's
/// lane, so implementations need no cross-mutation coordination within
/// an agent — but must be safe for concurrent use across agents. Every
/// mutation bumps the agent's graph version atomically with the write.
pub trait IGraphStore: Send + Sync {
    /// Append a committed node. Returns the agent's new graph version.
    fn append_node(&self, event: &StoryEvent) -> SpineResult<u64>;

    /// Transition an event's status, recording the audit row.
    /// Returns the agent's new graph version.
    fn mark_status(
        &self,
        event_id: &str,
        to_status: EventStatus,
        superseded_by: Option<&str>,
        reason: &str,
    ) -> SpineResult<u64>;

    /// Insert a typed edge. Returns the agent's new graph version.
    fn add_edge(&self, from_id: &str, to_id: &str, kind: EdgeKind, weakened: bool)
        -> SpineResult<u64>;

    fn get_event(&self, event_id: &str) -> SpineResult<Option<StoryEvent>>;

    fn events_by_ids(&self, ids: &[String]) -> SpineResult<Vec<StoryEvent>>;

    /// Most recent `n` events for an agent, newest first. Active only
    /// unless `include_inactive` (audit/debug reads).
    fn recent_window(
        &self,
        agent_id: &str,
        n: usize,
        include_inactive: bool,
    ) -> SpineResult<Vec<StoryEvent>>;

    fn edges_for_agent(&self, agent_id: &str) -> SpineResult<Vec<EdgeRecord>>;

    fn graph_version(&self, agent_id: &str) -> SpineResult<u64>;

    fn count_by_status(&self, agent_id: &str, status: EventStatus) -> SpineResult<usize>;

    /// Everything, including Superseded/Retracted/NeedsReview. Oldest
    /// first. Off the hot path.
    fn full_history(&self, agent_id: &str) -> SpineResult<Vec<StoryEvent>>;

    fn load_score(&self, agent_id: &str) -> SpineResult<Option<CoherenceScore>>;

    fn save_score(&self, score: &CoherenceScore) -> SpineResult<()>;
}
