/// Errors from the external scoring oracle. Always transient: a timeout
/// is never interpreted as "no contradiction".
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle call timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// The oracle answered but the payload violated the contract.
    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),
}
