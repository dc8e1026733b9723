//! Configuration for every spine subsystem, loadable from TOML with
//! serde defaults throughout.

mod cache_config;
mod coherence_config;
mod intake_config;
mod revision_config;
mod scorer_config;
mod sequencer_config;
mod store_config;

pub use cache_config::CacheConfig;
pub use coherence_config::CoherenceConfig;
pub use intake_config::IntakeConfig;
pub use revision_config::RevisionConfig;
pub use scorer_config::ScorerConfig;
pub use sequencer_config::SequencerConfig;
pub use store_config::StoreConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{SpineError, SpineResult};

/// Aggregate configuration for the Narrative Spine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpineConfig {
    pub store: StoreConfig,
    pub intake: IntakeConfig,
    pub sequencer: SequencerConfig,
    pub coherence: CoherenceConfig,
    pub revision: RevisionConfig,
    pub cache: CacheConfig,
    pub scorer: ScorerConfig,
}

impl SpineConfig {
    /// Parse from a TOML string. Unspecified fields take their defaults.
    pub fn from_toml_str(s: &str) -> SpineResult<Self> {
        let config: SpineConfig =
            toml::from_str(s).map_err(|e| SpineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    pub fn load(path: &std::path::Path) -> SpineResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SpineError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Range checks that serde cannot express.
    pub fn validate(&self) -> SpineResult<()> {
        if !(0.0..=1.0).contains(&self.coherence.actionability_threshold) {
            return Err(SpineError::Config(format!(
                "coherence.actionability_threshold {} outside [0, 1]",
                self.coherence.actionability_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.scorer.alert_threshold) {
            return Err(SpineError::Config(format!(
                "scorer.alert_threshold {} outside [0, 1]",
                self.scorer.alert_threshold
            )));
        }
        if self.coherence.window_size == 0 {
            return Err(SpineError::Config("coherence.window_size must be > 0".into()));
        }
        if self.sequencer.lane_capacity == 0 {
            return Err(SpineError::Config("sequencer.lane_capacity must be > 0".into()));
        }
        if self.revision.max_cascade_depth == 0 {
            return Err(SpineError::Config("revision.max_cascade_depth must be > 0".into()));
        }
        Ok(())
    }
}
