//! Cascade support: after a supersession, which Active dependents
//! relied on the superseded claim as their only support?
//!
//! The coherence engine drives the actual re-evaluation loop as
//! bounded re-queuing; this module only answers the structural
//! question on the hydrated graph.

use spine_graph::traversal::{active_causal_children, active_support_count};
use spine_graph::IndexedGraph;

/// Active causal children of `superseded_id` whose Active support
/// count has dropped to zero. These are exactly the dependents whose
/// validity hinged on the superseded claim, per the sole-support rule.
pub fn children_losing_sole_support(graph: &IndexedGraph, superseded_id: &str) -> Vec<String> {
    active_causal_children(graph, superseded_id)
        .into_iter()
        .filter(|child| active_support_count(graph, child) == 0)
        .collect()
}
