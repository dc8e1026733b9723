//! Causal traversals over the hydrated graph.

pub mod ancestors;
pub mod descendants;

pub use ancestors::causal_ancestors;
pub use descendants::{active_causal_children, active_descendant_count, active_support_count};
