//! Bounded narrative summaries from the recent Active window.

use chrono::Utc;

use spine_core::errors::SpineResult;
use spine_core::event::EventStatus;
use spine_core::models::{NarrativeSummary, SummaryStatement};
use spine_core::traits::IGraphStore;

/// Build a summary from the agent's most recent Active nodes.
/// Superseded statements never appear here; that is the cache-visible
/// face of the exclusivity invariant.
pub fn build_summary(
    store: &dyn IGraphStore,
    agent_id: &str,
    max_statements: usize,
) -> SpineResult<NarrativeSummary> {
    let window = store.recent_window(agent_id, max_statements, false)?;
    let statements = window
        .iter()
        .map(|event| SummaryStatement {
            event_id: event.event_id.clone(),
            event_type: event.event_type,
            content: event.content.clone(),
            timestamp: event.timestamp,
        })
        .collect();

    Ok(NarrativeSummary {
        statements,
        active_count: store.count_by_status(agent_id, EventStatus::Active)?,
        open_reviews: store.count_by_status(agent_id, EventStatus::NeedsReview)?,
        generated_at: Utc::now(),
    })
}
