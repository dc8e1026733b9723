//! Rolling per-agent coherence metric.
//!
//! An exponential moving average over ingestion outcomes: clean events
//! pull the score toward 1.0, resolved contradictions dip it, and
//! unresolved (NeedsReview) outcomes depress it hardest. Persisted per
//! agent so restarts keep continuity.

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use spine_core::config::ScorerConfig;
use spine_core::errors::SpineResult;
use spine_core::models::{CoherenceScore, IngestionOutcome};
use spine_core::traits::IGraphStore;

/// Result of a scorer update.
#[derive(Debug, Clone)]
pub struct ScoreUpdate {
    pub score: CoherenceScore,
    /// True when this update moved the score from at-or-above the
    /// alert threshold to below it.
    pub crossed_below: bool,
}

/// Concurrent per-agent score tracker.
pub struct CoherenceScorer {
    config: ScorerConfig,
    current: DashMap<String, f64>,
}

impl CoherenceScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self {
            config,
            current: DashMap::new(),
        }
    }

    /// Smoothing factor: an EMA whose effective memory matches the
    /// configured window length.
    fn alpha(&self) -> f64 {
        2.0 / (self.config.window as f64 + 1.0)
    }

    /// Sample value for one outcome.
    fn sample(outcome: IngestionOutcome) -> f64 {
        match outcome {
            IngestionOutcome::Clean => 1.0,
            IngestionOutcome::Resolved => 0.6,
            IngestionOutcome::NeedsReview => 0.0,
        }
    }

    /// Previous value, loading from the store on first touch.
    fn prior(&self, store: &dyn IGraphStore, agent_id: &str) -> SpineResult<f64> {
        if let Some(value) = self.current.get(agent_id) {
            return Ok(*value);
        }
        let persisted = store.load_score(agent_id)?.map(|s| s.value).unwrap_or(1.0);
        self.current.insert(agent_id.to_string(), persisted);
        Ok(persisted)
    }

    /// Fold one ingestion outcome into the agent's score and persist.
    pub fn record(
        &self,
        store: &dyn IGraphStore,
        agent_id: &str,
        outcome: IngestionOutcome,
    ) -> SpineResult<ScoreUpdate> {
        let prior = self.prior(store, agent_id)?;
        let alpha = self.alpha();
        let value = (prior * (1.0 - alpha) + Self::sample(outcome) * alpha).clamp(0.0, 1.0);
        self.current.insert(agent_id.to_string(), value);

        let score = CoherenceScore {
            agent_id: agent_id.to_string(),
            value,
            last_computed_at: Utc::now(),
        };
        store.save_score(&score)?;

        let crossed_below =
            prior >= self.config.alert_threshold && value < self.config.alert_threshold;
        debug!(agent_id, value, ?outcome, crossed_below, "coherence score updated");

        Ok(ScoreUpdate {
            score,
            crossed_below,
        })
    }

    /// Current score for an agent, falling back to the persisted value
    /// and then the 1.0 baseline.
    pub fn current(&self, store: &dyn IGraphStore, agent_id: &str) -> SpineResult<CoherenceScore> {
        let value = self.prior(store, agent_id)?;
        Ok(CoherenceScore {
            agent_id: agent_id.to_string(),
            value,
            last_computed_at: Utc::now(),
        })
    }

    pub fn alert_threshold(&self) -> f64 {
        self.config.alert_threshold
    }
}
