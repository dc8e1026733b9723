//! v001: intake_log — the write-ahead record of every accepted envelope.
//! The UNIQUE idempotency_key column is what makes at-least-once
//! delivery safe across restarts.

use rusqlite::Connection;

use spine_core::errors::SpineResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> SpineResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS intake_log (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id        TEXT NOT NULL UNIQUE,
            agent_id        TEXT NOT NULL,
            intake_seq      INTEGER NOT NULL,
            idempotency_key TEXT UNIQUE,
            envelope        TEXT NOT NULL,
            processed       INTEGER NOT NULL DEFAULT 0,
            received_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            UNIQUE (agent_id, intake_seq)
        );

        CREATE INDEX IF NOT EXISTS idx_intake_agent_pending
            ON intake_log(agent_id, processed, intake_seq);
        ",
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
