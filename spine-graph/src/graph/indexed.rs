//! petgraph::StableGraph wrapper with story-node and edge weights.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;
use serde::{Deserialize, Serialize};

use spine_core::event::{EventStatus, StoryEvent};
use spine_core::models::EdgeKind;

/// A node in the narrative graph. Carries the fields traversals and
/// tie-breaks need; full events stay in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryNode {
    pub event_id: String,
    pub status: EventStatus,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

impl StoryNode {
    pub fn from_event(event: &StoryEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            status: event.status,
            confidence: event.confidence.value(),
            timestamp: event.timestamp,
            content: event.content.clone(),
        }
    }
}

/// Weight on a narrative edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NarrativeEdgeWeight {
    pub kind: EdgeKind,
    /// Causal edge whose parent was not Active at link time.
    pub weakened: bool,
}

/// The underlying directed graph type.
pub type NarrativeStableGraph = StableGraph<StoryNode, NarrativeEdgeWeight, Directed>;

/// Wrapper providing indexed access to one agent's narrative graph.
pub struct IndexedGraph {
    pub graph: NarrativeStableGraph,
    /// Map from event_id to NodeIndex for O(1) lookup.
    pub node_index: HashMap<String, NodeIndex>,
}

impl IndexedGraph {
    /// Create an empty indexed graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Add a node, replacing the index entry if the id was present.
    pub fn add_node(&mut self, node: StoryNode) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node.event_id) {
            if let Some(weight) = self.graph.node_weight_mut(idx) {
                *weight = node;
            }
            return idx;
        }
        let event_id = node.event_id.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(event_id, idx);
        idx
    }

    /// Look up a node index by event id.
    pub fn get_node(&self, event_id: &str) -> Option<NodeIndex> {
        self.node_index.get(event_id).copied()
    }

    pub fn node_weight(&self, idx: NodeIndex) -> Option<&StoryNode> {
        self.graph.node_weight(idx)
    }

    /// Update a node's status in place (mirroring a store transition).
    pub fn set_status(&mut self, event_id: &str, status: EventStatus) -> bool {
        match self.get_node(event_id) {
            Some(idx) => {
                if let Some(node) = self.graph.node_weight_mut(idx) {
                    node.status = status;
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// Add an edge between known nodes. Duplicate edges of the same
    /// kind are ignored.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, weight: NarrativeEdgeWeight) {
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight().kind == weight.kind);
        if !exists {
            self.graph.add_edge(from, to, weight);
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for IndexedGraph {
    fn default() -> Self {
        Self::new()
    }
}
