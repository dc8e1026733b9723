//! Capability traits at the seams between spine crates.

mod graph_store;
mod oracle;

pub use graph_store::IGraphStore;
pub use oracle::IScoringOracle;
