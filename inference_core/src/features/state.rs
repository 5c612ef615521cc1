//! Inference state folded across the event sequence.

use crate::config::EngineConfig;
use crate::context_tracker::{ContextTracker, RunCounters};
use crate::evidence::FeatureContribution;
use crate::scoring::{ScalingContext, ScoreAccumulator};

use super::FeatureId;

/// Everything one inference run accumulates.
///
/// Built fresh per invocation; the streaming evaluator ([`InferenceState::observe`]) and
/// the aggregate pass ([`InferenceState::run_aggregate_pass`]) both write through it.
#[derive(Debug, Clone)]
pub struct InferenceState<'c> {
    pub(crate) config: &'c EngineConfig,
    pub tracker: ContextTracker,
    pub counters: RunCounters,
    pub accumulator: ScoreAccumulator<'c>,
}

impl<'c> InferenceState<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self {
            config,
            tracker: ContextTracker::new(),
            counters: RunCounters::default(),
            accumulator: ScoreAccumulator::new(config),
        }
    }

    /// Whether the run so far is in the learning regime.
    pub fn in_learning_regime(&self) -> bool {
        self.counters.in_learning_regime(&self.config.competence)
    }

    /// Conditions for applying a feature right now.
    pub fn scaling_context(&self) -> ScalingContext {
        ScalingContext {
            learning_regime: self.in_learning_regime(),
            opportunities: self.tracker.opportunities(),
        }
    }

    /// Route a feature through the accumulator under the current conditions.
    pub fn apply(&mut self, feature: FeatureId, note: impl Into<String>) -> &FeatureContribution {
        let ctx = self.scaling_context();
        self.accumulator.apply(feature, &ctx, note)
    }
}
