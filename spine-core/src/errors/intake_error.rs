/// Errors surfaced synchronously to publishers at the ingestion gateway.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// The envelope failed field validation. Terminal for the publisher.
    #[error("invalid envelope: field '{field}' {reason}")]
    InvalidEnvelope {
        field: &'static str,
        reason: String,
    },

    /// The agent's lane is at capacity. Publishers retry after a delay;
    /// other agents are unaffected.
    #[error("backpressure for agent {agent_id}: lane depth {depth} at capacity")]
    AgentBackpressure { agent_id: String, depth: usize },
}
