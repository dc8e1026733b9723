//! Status-transition audit trail.

use rusqlite::{params, Connection};

use spine_core::errors::SpineResult;
use spine_core::event::EventStatus;

use crate::to_store_err;

/// Record a status transition in the same transaction as the update.
pub fn record(
    conn: &Connection,
    event_id: &str,
    from_status: EventStatus,
    to_status: EventStatus,
    superseded_by: Option<&str>,
    reason: &str,
) -> SpineResult<()> {
    conn.execute(
        "INSERT INTO status_audit (event_id, from_status, to_status, superseded_by, reason)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event_id,
            from_status.as_str(),
            to_status.as_str(),
            superseded_by,
            reason
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

/// Number of audit rows for an event.
pub fn count_for_event(conn: &Connection, event_id: &str) -> SpineResult<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM status_audit WHERE event_id = ?1",
            [event_id],
            |row| row.get(0),
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(count as usize)
}
