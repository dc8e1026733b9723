//! # spine-store
//!
//! SQLite persistence layer for the Narrative Spine: durable intake log,
//! story nodes and edges, per-agent graph versions with invalidation
//! signals, dead letters, status audit trail, and coherence scores.
//!
//! One async-safe write connection serializes all writes; a read pool
//! serves queries. Mutations for a given agent only ever arrive from
//! that agent's lane, so per-agent ordering needs no extra locking.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::{Invalidation, StoreEngine};

use spine_core::errors::{SpineError, StoreError};

/// Wrap a low-level SQLite error message into the spine error type.
pub fn to_store_err(message: impl Into<String>) -> SpineError {
    SpineError::Store(StoreError::Sqlite {
        message: message.into(),
    })
}
