use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Narrative graph edge type.
///
/// `Causal` edges are directed parent -> child and cycle-checked.
/// `Contradicts` edges are stored once and read as bidirectional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Causal,
    Contradicts,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Causal => "causal",
            EdgeKind::Contradicts => "contradicts",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "causal" => Some(EdgeKind::Causal),
            "contradicts" => Some(EdgeKind::Contradicts),
            _ => None,
        }
    }
}

/// A stored edge row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from_id: String,
    pub to_id: String,
    pub kind: EdgeKind,
    /// A causal edge whose parent was no longer Active at link time.
    pub weakened: bool,
    pub created_at: DateTime<Utc>,
}
