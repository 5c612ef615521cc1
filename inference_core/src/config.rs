//! Engine configuration.
//!
//! The defaults are the calibrated contract values; changing them changes every score
//! the engine produces. Overrides are meant for calibration experiments and can be
//! loaded from a partial TOML document:
//!
//! ```toml
//! temperature = 2.5
//!
//! [competence]
//! min_pour_attempts = 20
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("`{field}` {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Scalar knobs of the inference pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-application multiplicative decay of the score vector (0.0-1.0].
    pub decay: f64,

    /// Scores are clamped to `[-score_bound, score_bound]` after every mutation.
    pub score_bound: f64,

    /// Softmax temperature used to turn scores into probabilities.
    pub temperature: f64,

    /// Number of evidence entries kept in the result.
    pub evidence_limit: usize,

    pub competence: CompetenceGate,
    pub opportunity: OpportunityScaling,
    pub confidence: ConfidenceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay: 0.985,
            score_bound: 30.0,
            temperature: 3.0,
            evidence_limit: 3,
            competence: CompetenceGate::default(),
            opportunity: OpportunityScaling::default(),
            confidence: ConfidenceConfig::default(),
        }
    }
}

/// Damping applied while the player is still learning the controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetenceGate {
    /// Below this many pour attempts the run is in the learning regime.
    pub min_pour_attempts: u64,

    /// Above this illegal-pour rate the run is in the learning regime.
    pub max_illegal_rate: f64,

    /// Multiplier applied to every delta in the learning regime.
    pub damp: f64,
}

impl Default for CompetenceGate {
    fn default() -> Self {
        Self {
            min_pour_attempts: 12,
            max_illegal_rate: 0.25,
            damp: 0.35,
        }
    }
}

/// Evidence scaling when a mechanic is absent from the current level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunityScaling {
    /// Knowledge multiplier when the level has no sealed-unknown vessels.
    pub no_unknowns_knowledge: f64,

    /// Nurturing multiplier when instability is disabled.
    pub no_instability_nurturing: f64,

    /// Whole-delta multiplier for keystone-family features when nothing is corked.
    pub no_corks_keystone: f64,
}

impl Default for OpportunityScaling {
    fn default() -> Self {
        Self {
            no_unknowns_knowledge: 0.6,
            no_instability_nurturing: 0.5,
            no_corks_keystone: 0.4,
        }
    }
}

/// Constants of the confidence estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Meaningful-event count at which the volume term saturates.
    pub saturation_events: u64,

    /// How strongly the illegal rate erodes competence.
    pub illegal_penalty: f64,

    /// Share of confidence granted regardless of separation.
    pub separation_floor: f64,

    /// Ceiling while the run is in the learning regime.
    pub learning_cap: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            saturation_events: 120,
            illegal_penalty: 1.5,
            separation_floor: 0.55,
            learning_cap: 0.45,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) TOML document and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the score or probability invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(invalid("decay", format!("must be in (0, 1], got {}", self.decay)));
        }
        if !(self.score_bound.is_finite() && self.score_bound > 0.0) {
            return Err(invalid(
                "score_bound",
                format!("must be positive and finite, got {}", self.score_bound),
            ));
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(invalid(
                "temperature",
                format!("must be positive and finite, got {}", self.temperature),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence.learning_cap) {
            return Err(invalid(
                "confidence.learning_cap",
                format!("must be in [0, 1], got {}", self.confidence.learning_cap),
            ));
        }
        if self.confidence.saturation_events == 0 {
            return Err(invalid("confidence.saturation_events", "must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
