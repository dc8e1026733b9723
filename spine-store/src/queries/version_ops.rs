//! Per-agent graph-version counter. Bumped inside the same transaction
//! as the mutation it describes.

use rusqlite::Connection;

use spine_core::errors::SpineResult;

use crate::to_store_err;

/// Increment and return the agent's graph version.
pub fn bump(conn: &Connection, agent_id: &str) -> SpineResult<u64> {
    let version: i64 = conn
        .query_row(
            "INSERT INTO graph_versions (agent_id, version, updated_at)
             VALUES (?1, 1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
             ON CONFLICT(agent_id) DO UPDATE SET
                 version = version + 1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             RETURNING version",
            [agent_id],
            |row| row.get(0),
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(version as u64)
}

/// Current graph version; 0 for an agent with no mutations yet.
pub fn current(conn: &Connection, agent_id: &str) -> SpineResult<u64> {
    let version: i64 = conn
        .query_row(
            "SELECT COALESCE(
                (SELECT version FROM graph_versions WHERE agent_id = ?1), 0)",
            [agent_id],
            |row| row.get(0),
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(version as u64)
}
