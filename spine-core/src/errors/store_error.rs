/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    /// A graph mutation could not be committed. Retried by the
    /// sequencer; on exhaustion the event is dead-lettered.
    #[error("store write failed: {reason}")]
    WriteFailed { reason: String },

    #[error("not found: {0}")]
    NotFound(String),
}
