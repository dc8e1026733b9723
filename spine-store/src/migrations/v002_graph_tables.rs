//! v002: story_nodes, story_edges, graph_versions.

use rusqlite::Connection;

use spine_core::errors::SpineResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> SpineResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS story_nodes (
            event_id        TEXT PRIMARY KEY,
            agent_id        TEXT NOT NULL,
            event_type      TEXT NOT NULL,
            content         TEXT NOT NULL,
            source_service  TEXT NOT NULL,
            local_reference TEXT,
            confidence      REAL NOT NULL,
            timestamp       TEXT NOT NULL,
            ingested_at     TEXT NOT NULL,
            causal_parents  TEXT NOT NULL DEFAULT '[]',
            status          TEXT NOT NULL DEFAULT 'active',
            superseded_by   TEXT,
            intake_seq      INTEGER NOT NULL,
            content_hash    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_nodes_agent_status ON story_nodes(agent_id, status);
        CREATE INDEX IF NOT EXISTS idx_nodes_agent_seq ON story_nodes(agent_id, intake_seq);

        CREATE TABLE IF NOT EXISTS story_edges (
            from_id    TEXT NOT NULL,
            to_id      TEXT NOT NULL,
            kind       TEXT NOT NULL,
            weakened   INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (from_id, to_id, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_edges_from ON story_edges(from_id);
        CREATE INDEX IF NOT EXISTS idx_edges_to ON story_edges(to_id);

        CREATE TABLE IF NOT EXISTS graph_versions (
            agent_id   TEXT PRIMARY KEY,
            version    INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        ",
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
