//! Production oracle client: JSON POST against the configured scoring
//! endpoint. The wire contract is
//! `{new_statement, candidates} -> [{index, type, confidence}]`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use spine_core::config::CoherenceConfig;
use spine_core::errors::{OracleError, SpineError, SpineResult};
use spine_core::models::{ContradictionAxis, OracleFinding};
use spine_core::traits::IScoringOracle;

#[derive(Serialize)]
struct ScoreRequest<'a> {
    new_statement: &'a str,
    candidates: &'a [String],
}

#[derive(Deserialize)]
struct WireFinding {
    index: usize,
    #[serde(rename = "type")]
    axis: ContradictionAxis,
    confidence: f64,
}

/// reqwest-based oracle client.
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOracle {
    /// Build from config. Fails fast when no endpoint is configured so
    /// a misconfigured deployment doesn't silently score everything
    /// clean.
    pub fn new(config: &CoherenceConfig) -> SpineResult<Self> {
        if config.oracle_endpoint.is_empty() {
            return Err(SpineError::Config(
                "coherence.oracle_endpoint is not set".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SpineError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.oracle_endpoint.clone(),
        })
    }
}

#[async_trait]
impl IScoringOracle for HttpOracle {
    async fn score(
        &self,
        new_statement: &str,
        candidates: &[String],
    ) -> SpineResult<Vec<OracleFinding>> {
        let request = ScoreRequest {
            new_statement,
            candidates,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OracleError::Unavailable(format!(
                "oracle returned HTTP {}",
                response.status()
            ))
            .into());
        }

        let findings: Vec<WireFinding> = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        findings
            .into_iter()
            .map(|f| {
                if f.index >= candidates.len() {
                    return Err(OracleError::MalformedResponse(format!(
                        "index {} out of range for {} candidates",
                        f.index,
                        candidates.len()
                    ))
                    .into());
                }
                Ok(OracleFinding {
                    index: f.index,
                    axis: f.axis,
                    confidence: f.confidence.clamp(0.0, 1.0),
                })
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
