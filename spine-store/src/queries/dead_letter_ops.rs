//! Dead-letter parking and replay bookkeeping.

use rusqlite::{params, Connection};

use spine_core::errors::SpineResult;
use spine_core::models::DeadLetter;

use super::parse_ts;
use crate::to_store_err;

/// Park an event after retry exhaustion.
pub fn park(
    conn: &Connection,
    agent_id: &str,
    event_id: &str,
    error: &str,
    retry_count: u32,
) -> SpineResult<i64> {
    conn.execute(
        "INSERT OR REPLACE INTO dead_letters (agent_id, event_id, error, retry_count, replayed)
         VALUES (?1, ?2, ?3, ?4, 0)",
        params![agent_id, event_id, error, retry_count],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// Un-replayed dead letters for an agent, oldest first.
pub fn for_agent(conn: &Connection, agent_id: &str) -> SpineResult<Vec<DeadLetter>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, agent_id, event_id, error, retry_count, parked_at
             FROM dead_letters
             WHERE agent_id = ?1 AND replayed = 0
             ORDER BY id ASC",
        )
        .map_err(|e| to_store_err(e.to_string()))?;

    let rows = stmt
        .query_map([agent_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .map_err(|e| to_store_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (id, agent_id, event_id, error, retry_count, parked_raw) =
            row.map_err(|e| to_store_err(e.to_string()))?;
        out.push(DeadLetter {
            id,
            agent_id,
            event_id,
            error,
            retry_count,
            parked_at: parse_ts(&parked_raw)?,
        });
    }
    Ok(out)
}

/// Whether an agent currently has an un-replayed dead letter (its lane
/// is halted).
pub fn has_parked(conn: &Connection, agent_id: &str) -> SpineResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM dead_letters WHERE agent_id = ?1 AND replayed = 0",
            [agent_id],
            |row| row.get(0),
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(count > 0)
}

/// Mark a dead letter replayed. Returns `(agent_id, event_id)` so the
/// caller can resume that agent's lane.
pub fn mark_replayed(conn: &Connection, id: i64) -> SpineResult<(String, String)> {
    let row: (String, String) = conn
        .query_row(
            "SELECT agent_id, event_id FROM dead_letters WHERE id = ?1 AND replayed = 0",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => spine_core::SpineError::Store(
                spine_core::errors::StoreError::NotFound(format!("dead letter {id}")),
            ),
            other => to_store_err(other.to_string()),
        })?;
    conn.execute("UPDATE dead_letters SET replayed = 1 WHERE id = ?1", [id])
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(row)
}
