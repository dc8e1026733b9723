//! Coherence-score persistence.

use rusqlite::{params, Connection, OptionalExtension};

use spine_core::errors::SpineResult;
use spine_core::models::CoherenceScore;

use super::parse_ts;
use crate::to_store_err;

pub fn upsert(conn: &Connection, score: &CoherenceScore) -> SpineResult<()> {
    conn.execute(
        "INSERT INTO coherence_scores (agent_id, value, last_computed_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(agent_id) DO UPDATE SET
             value = excluded.value,
             last_computed_at = excluded.last_computed_at",
        params![
            score.agent_id,
            score.value,
            score.last_computed_at.to_rfc3339()
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

pub fn get(conn: &Connection, agent_id: &str) -> SpineResult<Option<CoherenceScore>> {
    let row: Option<(f64, String)> = conn
        .query_row(
            "SELECT value, last_computed_at FROM coherence_scores WHERE agent_id = ?1",
            [agent_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| to_store_err(e.to_string()))?;

    match row {
        Some((value, computed_raw)) => Ok(Some(CoherenceScore {
            agent_id: agent_id.to_string(),
            value,
            last_computed_at: parse_ts(&computed_raw)?,
        })),
        None => Ok(None),
    }
}
