//! Inference output.

use game_telemetry::{Archetype, ArchetypeVector, LevelBand};
use serde::{Deserialize, Serialize};

use crate::context_tracker::OpportunityContext;
use crate::evidence::FeatureContribution;

/// The outcome of one inference run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    /// Softmax of `scores`; sums to one.
    pub probabilities: ArchetypeVector,

    /// How much the caller should trust `probabilities`, in `[0, 1]`.
    pub confidence: f64,

    /// Raw accumulated scores, each within the configured bound.
    pub scores: ArchetypeVector,

    /// Strongest feature applications, strongest first.
    pub evidence: Vec<FeatureContribution>,

    pub diagnostics: Diagnostics,
}

/// Run statistics reported alongside the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub total_events: u64,
    /// Input entries dropped for an unknown kind or shape.
    pub skipped_events: u64,
    pub meaningful_events: u64,
    pub total_pour_attempts: u64,
    pub illegal_pour_attempts: u64,
    pub illegal_rate: f64,
    pub learning_regime: bool,
    /// Total feature applications, before ranking.
    pub feature_applications: u64,
    /// Number of `level_start` events in the log.
    pub levels_started: u32,
    /// Context of the last level in the log.
    pub opportunities: OpportunityContext,
    pub level_band: LevelBand,
}

impl InferenceResult {
    /// The most probable archetype. Ties resolve in canonical archetype order.
    pub fn dominant(&self) -> Archetype {
        self.probabilities.argmax()
    }

    /// Serialize to the JSON output contract.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
