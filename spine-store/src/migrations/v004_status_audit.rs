//! v004: status_audit — every status transition, forever. Nodes are
//! never deleted; this table is the proof of what happened to them.

use rusqlite::Connection;

use spine_core::errors::SpineResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> SpineResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS status_audit (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id      TEXT NOT NULL,
            from_status   TEXT NOT NULL,
            to_status     TEXT NOT NULL,
            superseded_by TEXT,
            reason        TEXT NOT NULL,
            changed_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_status_audit_event ON status_audit(event_id);
        ",
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
