//! v005: coherence_scores — persisted so restarts don't reset an
//! agent's rolling coherence.

use rusqlite::Connection;

use spine_core::errors::SpineResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> SpineResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS coherence_scores (
            agent_id         TEXT PRIMARY KEY,
            value            REAL NOT NULL,
            last_computed_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
