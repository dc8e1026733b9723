//! Error taxonomy for the Narrative Spine.
//!
//! Sub-enums are per subsystem; `SpineError` aggregates them. The
//! transient/terminal split here is what drives the sequencer's
//! retry-then-dead-letter policy.

mod graph_error;
mod intake_error;
mod oracle_error;
mod revision_error;
mod store_error;

pub use graph_error::GraphError;
pub use intake_error::IntakeError;
pub use oracle_error::OracleError;
pub use revision_error::RevisionError;
pub use store_error::StoreError;

/// Top-level error for all spine operations.
#[derive(Debug, thiserror::Error)]
pub enum SpineError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Revision(#[from] RevisionError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SpineError {
    /// Whether the sequencer should retry this failure with backoff.
    ///
    /// Transient: oracle timeouts/unavailability and store write
    /// failures. Everything else is terminal — retrying a logic error
    /// would stall the lane forever without progress.
    pub fn is_transient(&self) -> bool {
        match self {
            SpineError::Oracle(OracleError::Timeout { .. })
            | SpineError::Oracle(OracleError::Unavailable(_)) => true,
            SpineError::Store(StoreError::Sqlite { .. })
            | SpineError::Store(StoreError::WriteFailed { .. }) => true,
            _ => false,
        }
    }
}

/// Result alias used across every spine crate.
pub type SpineResult<T> = Result<T, SpineError>;
