//! The narrative-exclusivity audit.
//!
//! Invariant: no two Active nodes joined by a Contradicts edge may
//! coexist once belief revision has run for an ingestion. This module
//! is the checkable form of that statement; tests and admin surfaces
//! call it after every resolution.

use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use spine_core::event::EventStatus;
use spine_core::models::EdgeKind;

use crate::graph::indexed::IndexedGraph;

/// Every violating pair `(a, b)` of Active nodes joined by a
/// Contradicts edge. Empty on a coherent graph.
pub fn violations(graph: &IndexedGraph) -> Vec<(String, String)> {
    let mut violations = Vec::new();
    for edge in graph.graph.edge_references() {
        if edge.weight().kind != EdgeKind::Contradicts {
            continue;
        }
        let (Some(a), Some(b)) = (
            graph.node_weight(edge.source()),
            graph.node_weight(edge.target()),
        ) else {
            continue;
        };
        if a.status == EventStatus::Active && b.status == EventStatus::Active {
            violations.push((a.event_id.clone(), b.event_id.clone()));
        }
    }
    violations
}

/// Convenience predicate over [`violations`].
pub fn is_coherent(graph: &IndexedGraph) -> bool {
    violations(graph).is_empty()
}
