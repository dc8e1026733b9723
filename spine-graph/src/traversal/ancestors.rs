//! Causal ancestor closure.

use std::collections::HashSet;

use petgraph::visit::EdgeRef;
use petgraph::Direction;

use spine_core::models::EdgeKind;

use crate::graph::indexed::IndexedGraph;

/// The transitive closure of causal parents of `event_id`, as event
/// ids. Excludes the starting node. Unknown ids yield an empty set.
pub fn causal_ancestors(graph: &IndexedGraph, event_id: &str) -> Vec<String> {
    let Some(start) = graph.get_node(event_id) else {
        return Vec::new();
    };

    let mut visited = HashSet::new();
    let mut stack = vec![start];
    let mut out = Vec::new();

    while let Some(node) = stack.pop() {
        for edge in graph.graph.edges_directed(node, Direction::Incoming) {
            if edge.weight().kind != EdgeKind::Causal {
                continue;
            }
            let parent = edge.source();
            if visited.insert(parent) {
                stack.push(parent);
                if let Some(weight) = graph.node_weight(parent) {
                    out.push(weight.event_id.clone());
                }
            }
        }
    }
    out
}
