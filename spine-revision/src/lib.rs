//! # spine-revision
//!
//! The belief-revision resolver. When the coherence engine finds an
//! actionable contradiction, this crate decides which side of it
//! survives, applies the supersessions, and reports which dependents
//! lost their sole support and must be re-evaluated. The cascade loop
//! itself is driven by the coherence engine as bounded re-queuing, not
//! recursion.

pub mod cascade;
pub mod resolver;

pub use resolver::{RevisionResolver, RoundOutcome};
