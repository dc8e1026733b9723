//! Build an IndexedGraph for one agent from the store.

use spine_core::errors::SpineResult;
use spine_core::traits::IGraphStore;

use super::indexed::{IndexedGraph, NarrativeEdgeWeight, StoryNode};

/// Hydrate the full graph (all statuses) for an agent. The revision
/// resolver needs superseded nodes present to walk historical support.
pub fn hydrate(store: &dyn IGraphStore, agent_id: &str) -> SpineResult<IndexedGraph> {
    let mut graph = IndexedGraph::new();

    for event in store.full_history(agent_id)? {
        graph.add_node(StoryNode::from_event(&event));
    }

    for edge in store.edges_for_agent(agent_id)? {
        // Edges referencing unknown nodes are skipped rather than
        // fabricated; the store's join already scopes them to the agent.
        if let (Some(from), Some(to)) = (graph.get_node(&edge.from_id), graph.get_node(&edge.to_id))
        {
            graph.add_edge(
                from,
                to,
                NarrativeEdgeWeight {
                    kind: edge.kind,
                    weakened: edge.weakened,
                },
            );
        }
    }

    Ok(graph)
}
