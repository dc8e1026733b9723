use async_trait::async_trait;

use crate::errors::SpineResult;
use crate::models::OracleFinding;

/// The external contradiction-scoring oracle.
///
/// Given a new statement and the candidate statements from the agent's
/// recent window, returns the candidates the new statement contradicts.
/// The coherence engine never assumes a specific implementation; tests
/// run against a deterministic rule-based one.
#[async_trait]
pub trait IScoringOracle: Send + Sync {
    async fn score(
        &self,
        new_statement: &str,
        candidates: &[String],
    ) -> SpineResult<Vec<OracleFinding>>;

    /// Implementation name, for logs.
    fn name(&self) -> &'static str;
}
