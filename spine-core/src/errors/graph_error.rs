/// Errors from the in-memory narrative graph layer.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The proposed causal edge would create a cycle.
    #[error("causal edge {from} -> {to} rejected: would create a cycle")]
    CycleRejected { from: String, to: String },

    #[error("unknown node: {0}")]
    UnknownNode(String),
}
