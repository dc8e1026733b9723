//! # spine-coherence
//!
//! The coherence engine. For every sequenced event it pulls the
//! agent's recent Active window, asks the scoring oracle whether the
//! new statement contradicts any window member, commits the node and
//! its edges, and — on an actionable contradiction — drives belief
//! revision to completion (bounded cascade included) before returning.
//!
//! Also home to the oracle implementations (HTTP production client and
//! a deterministic rule stub) and the rolling per-agent coherence
//! scorer.

pub mod engine;
pub mod oracle;
pub mod scorer;

pub use engine::CoherenceEngine;
pub use oracle::http::HttpOracle;
pub use oracle::rules::RuleOracle;
pub use scorer::{CoherenceScorer, ScoreUpdate};
