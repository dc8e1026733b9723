//! v003: dead_letters — events parked after retry exhaustion.

use rusqlite::Connection;

use spine_core::errors::SpineResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> SpineResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS dead_letters (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            agent_id    TEXT NOT NULL,
            event_id    TEXT NOT NULL UNIQUE,
            error       TEXT NOT NULL,
            retry_count INTEGER NOT NULL,
            parked_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            replayed    INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_dead_letters_agent ON dead_letters(agent_id, replayed);
        ",
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
