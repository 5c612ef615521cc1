//! Inference Engine - runs the full pipeline over an event log.
//!
//! The pipeline works as follows:
//! 1. **Normalize**: stable timestamp sort of the input events
//! 2. **Stream**: fold each event into the inference state, applying single-event features
//! 3. **Aggregate**: apply features that need whole-log statistics
//! 4. **Convert**: softmax the final scores into probabilities
//! 5. **Estimate**: derive confidence from volume, competence, and separation
//! 6. **Rank**: keep the strongest evidence entries
//!
//! Every call is a pure function of its input; the engine holds nothing but configuration.

mod result;

pub use result::*;

use game_telemetry::{EventLog, LogError, TelemetryEvent};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::confidence::{self, ConfidenceInputs};
use crate::error::InferenceError;
use crate::evidence;
use crate::features::InferenceState;
use crate::scoring::softmax;

/// The archetype inference engine.
#[derive(Debug, Clone, Default)]
pub struct InferenceEngine {
    config: EngineConfig,
}

impl InferenceEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Create an engine with the calibrated default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Create an engine from a TOML configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, InferenceError> {
        Ok(Self::new(EngineConfig::from_toml_str(text)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Infer from typed events in any order.
    pub fn infer(&self, events: &[TelemetryEvent]) -> InferenceResult {
        self.infer_log(&EventLog::new(events.iter().cloned()))
    }

    /// Infer from a loosely-typed JSON value, which must be an array of events.
    pub fn infer_value(&self, value: &Value) -> Result<InferenceResult, InferenceError> {
        let log = EventLog::from_value(value).inspect_err(|err| {
            tracing::warn!(%err, "rejecting telemetry input");
        })?;
        Ok(self.infer_log(&log))
    }

    /// Infer from JSON text in the at-rest log format.
    pub fn infer_json(&self, text: &str) -> Result<InferenceResult, InferenceError> {
        let value: Value = serde_json::from_str(text).map_err(LogError::from)?;
        self.infer_value(&value)
    }

    /// Infer once per level run, as a calibration pass does.
    pub fn infer_runs(&self, log: &EventLog) -> Vec<InferenceResult> {
        log.split_runs().iter().map(|run| self.infer_log(run)).collect()
    }

    /// Infer from an already normalized log.
    pub fn infer_log(&self, log: &EventLog) -> InferenceResult {
        tracing::debug!(
            events = log.len(),
            skipped = log.skipped(),
            "running archetype inference"
        );

        let mut state = InferenceState::new(&self.config);
        for event in log.events() {
            state.observe(event);
        }
        state.run_aggregate_pass();

        let learning_regime = state.in_learning_regime();
        let counters = state.counters;
        let levels_started = state.tracker.levels_started();
        let level = state.tracker.current();
        let opportunities = level.opportunities;
        let level_band = level.band();

        let (scores, contributions) = state.accumulator.into_parts();
        let probabilities = softmax(&scores, self.config.temperature);

        let confidence = confidence::estimate(
            &probabilities,
            &ConfidenceInputs {
                meaningful_events: counters.meaningful_events,
                illegal_rate: counters.illegal_rate(),
                learning_regime,
            },
            &self.config.confidence,
        );

        let diagnostics = Diagnostics {
            total_events: counters.total_events,
            skipped_events: log.skipped() as u64,
            meaningful_events: counters.meaningful_events,
            total_pour_attempts: counters.pour_attempts,
            illegal_pour_attempts: counters.illegal_pour_attempts,
            illegal_rate: counters.illegal_rate(),
            learning_regime,
            feature_applications: contributions.len() as u64,
            levels_started,
            opportunities,
            level_band,
        };

        let result = InferenceResult {
            probabilities,
            confidence,
            scores,
            evidence: evidence::rank(contributions, self.config.evidence_limit),
            diagnostics,
        };

        tracing::debug!(
            dominant = %result.dominant(),
            confidence = result.confidence,
            features = result.diagnostics.feature_applications,
            "archetype inference complete"
        );
        result
    }
}
