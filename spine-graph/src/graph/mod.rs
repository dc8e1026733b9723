//! Graph construction: the petgraph wrapper and store hydration.

pub mod cycle;
pub mod hydrate;
pub mod indexed;
