//! Shared model types used across spine crates.

mod alert;
mod coherence;
mod context;
mod contradiction;
mod dead_letter;
mod edge;
mod resolution;

pub use alert::{AlertKind, CoherenceAlert};
pub use coherence::{CoherenceScore, CommitOutcome, IngestionOutcome};
pub use context::{NarrativeContext, NarrativeSummary, SummaryStatement};
pub use contradiction::{ContradictionAxis, ContradictionFinding, OracleFinding};
pub use dead_letter::DeadLetter;
pub use edge::{EdgeKind, EdgeRecord};
pub use resolution::{Resolution, Revision};
