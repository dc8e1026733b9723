/// Errors from the belief-revision resolver.
#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    /// The cascade hit the configured depth bound. The remaining chain
    /// is flagged NeedsReview rather than auto-resolved.
    #[error("resolution depth exceeded for agent {agent_id} at depth {depth}")]
    DepthExceeded { agent_id: String, depth: usize },

    #[error("event missing during resolution: {0}")]
    MissingEvent(String),
}
