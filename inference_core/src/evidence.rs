//! Evidence Ranker - the explainability trail.

use game_telemetry::{ArchetypeVector, EventKind};
use serde::{Deserialize, Serialize};

use crate::features::FeatureId;

/// One feature application, as it was actually folded into the scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureContribution {
    #[serde(rename = "featureId")]
    pub feature: FeatureId,

    /// Event kind whose weight scaled this application.
    pub event_kind: EventKind,

    /// Sum of absolute components of `delta`.
    #[serde(rename = "weight")]
    pub magnitude: f64,

    /// Per-archetype delta after all scaling.
    pub delta: ArchetypeVector,

    pub note: String,
}

impl FeatureContribution {
    pub fn new(feature: FeatureId, delta: ArchetypeVector, note: impl Into<String>) -> Self {
        Self {
            feature,
            event_kind: feature.trigger(),
            magnitude: delta.abs_sum(),
            delta,
            note: note.into(),
        }
    }
}

/// Keep the `limit` strongest contributions, strongest first.
///
/// Equal magnitudes keep their application order.
pub fn rank(mut contributions: Vec<FeatureContribution>, limit: usize) -> Vec<FeatureContribution> {
    contributions.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    contributions.truncate(limit);
    contributions
}
