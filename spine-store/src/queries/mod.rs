//! Per-concern query modules. All take a `&Connection` so they compose
//! inside the caller's transaction.

pub mod audit_ops;
pub mod dead_letter_ops;
pub mod edge_ops;
pub mod intake_ops;
pub mod node_ops;
pub mod score_ops;
pub mod version_ops;

use chrono::{DateTime, Utc};

use spine_core::errors::SpineResult;

use crate::to_store_err;

/// Parse an RFC 3339 timestamp stored as TEXT.
pub(crate) fn parse_ts(raw: &str) -> SpineResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| to_store_err(format!("bad timestamp '{raw}': {e}")))
}
