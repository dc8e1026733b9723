//! Causal descendant traversals: the inputs to the revision tie-break
//! and the cascade.

use std::collections::HashSet;

use petgraph::visit::EdgeRef;
use petgraph::Direction;

use spine_core::event::EventStatus;
use spine_core::models::EdgeKind;

use crate::graph::indexed::IndexedGraph;

/// Number of distinct Active nodes transitively enabled by `event_id`.
/// Traversal crosses non-Active intermediates: a superseded link in the
/// chain doesn't hide the still-Active things built on top of it.
pub fn active_descendant_count(graph: &IndexedGraph, event_id: &str) -> usize {
    let Some(start) = graph.get_node(event_id) else {
        return 0;
    };

    let mut visited = HashSet::new();
    let mut stack = vec![start];
    let mut count = 0;

    while let Some(node) = stack.pop() {
        for edge in graph.graph.edges_directed(node, Direction::Outgoing) {
            if edge.weight().kind != EdgeKind::Causal {
                continue;
            }
            let child = edge.target();
            if visited.insert(child) {
                stack.push(child);
                if let Some(weight) = graph.node_weight(child) {
                    if weight.status == EventStatus::Active {
                        count += 1;
                    }
                }
            }
        }
    }
    count
}

/// Direct Active causal children of `event_id`.
pub fn active_causal_children(graph: &IndexedGraph, event_id: &str) -> Vec<String> {
    let Some(node) = graph.get_node(event_id) else {
        return Vec::new();
    };

    graph
        .graph
        .edges_directed(node, Direction::Outgoing)
        .filter(|e| e.weight().kind == EdgeKind::Causal)
        .filter_map(|e| graph.node_weight(e.target()))
        .filter(|n| n.status == EventStatus::Active)
        .map(|n| n.event_id.clone())
        .collect()
}

/// How many of `event_id`'s direct causal parents are still Active.
/// A child whose count is zero after a supersession lost its sole
/// support and must be re-evaluated.
pub fn active_support_count(graph: &IndexedGraph, event_id: &str) -> usize {
    let Some(node) = graph.get_node(event_id) else {
        return 0;
    };

    graph
        .graph
        .edges_directed(node, Direction::Incoming)
        .filter(|e| e.weight().kind == EdgeKind::Causal)
        .filter_map(|e| graph.node_weight(e.source()))
        .filter(|n| n.status == EventStatus::Active)
        .count()
}
