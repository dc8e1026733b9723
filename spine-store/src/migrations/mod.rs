//! Schema migrations, applied in order and recorded in
//! `schema_migrations`. Each migration is an idempotent batch.

mod v001_intake_log;
mod v002_graph_tables;
mod v003_dead_letters;
mod v004_status_audit;
mod v005_score_table;

use rusqlite::Connection;

use spine_core::errors::{SpineError, StoreError};

use crate::to_store_err;

type Migration = fn(&Connection) -> spine_core::errors::SpineResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_intake_log::migrate),
    (2, v002_graph_tables::migrate),
    (3, v003_dead_letters::migrate),
    (4, v004_status_audit::migrate),
    (5, v005_score_table::migrate),
];

/// Run all pending migrations on the given connection.
pub fn run_migrations(conn: &Connection) -> spine_core::errors::SpineResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_store_err(e.to_string()))?;

    for (version, migrate) in MIGRATIONS {
        let applied: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = ?1)",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| to_store_err(e.to_string()))?;
        if applied {
            continue;
        }

        migrate(conn).map_err(|e| {
            SpineError::Store(StoreError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })
        })?;
        conn.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| to_store_err(e.to_string()))?;
        tracing::debug!(version, "applied migration");
    }
    Ok(())
}
