//! Causal-cycle rejection. A narrative where an event transitively
//! enables itself is malformed, so every causal edge is reachability-
//! checked before insertion. Contradicts edges are ignored here.

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use spine_core::models::EdgeKind;

use super::indexed::IndexedGraph;

/// Check whether adding a causal edge `source -> target` would create
/// a cycle: true when `target` can already causally reach `source`.
pub fn would_create_cycle(graph: &IndexedGraph, source: NodeIndex, target: NodeIndex) -> bool {
    // Self-loops are always cycles.
    if source == target {
        return true;
    }
    causally_reaches(graph, target, source)
}

/// DFS over causal edges only: can we reach `to` from `from`?
fn causally_reaches(graph: &IndexedGraph, from: NodeIndex, to: NodeIndex) -> bool {
    let mut stack = vec![from];
    let mut visited = std::collections::HashSet::new();
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !visited.insert(node) {
            continue;
        }
        for edge in graph.graph.edges_directed(node, Direction::Outgoing) {
            if edge.weight().kind == EdgeKind::Causal {
                stack.push(edge.target());
            }
        }
    }
    false
}

/// Audit: every causal cycle currently in the graph, as node-id lists.
/// A healthy graph returns no entries.
pub fn find_causal_cycles(graph: &IndexedGraph) -> Vec<Vec<String>> {
    use petgraph::algo::tarjan_scc;
    use petgraph::visit::EdgeFiltered;

    let filtered = EdgeFiltered::from_fn(&graph.graph, |e| e.weight().kind == EdgeKind::Causal);
    tarjan_scc(&filtered)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            scc.into_iter()
                .filter_map(|idx| graph.node_weight(idx).map(|n| n.event_id.clone()))
                .collect()
        })
        .collect()
}
