//! Score Accumulator - the decaying, clamped archetype score vector.
//!
//! Every feature application follows the same sequence:
//! 1. **Decay**: multiply the current scores by the decay constant, then clamp
//! 2. **Scale**: competence damp, opportunity scaling, event weight (in that order)
//! 3. **Add**: add the scaled delta, then clamp again
//! 4. **Record**: append a [`FeatureContribution`] to the evidence log

use game_telemetry::{Archetype, ArchetypeVector};

use crate::config::EngineConfig;
use crate::context_tracker::OpportunityContext;
use crate::evidence::FeatureContribution;
use crate::features::{FeatureFamily, FeatureId};

/// Conditions in force when a feature is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingContext {
    /// The run is still in the learning regime.
    pub learning_regime: bool,
    pub opportunities: OpportunityContext,
}

/// Accumulates scaled feature deltas into a bounded score vector.
#[derive(Debug, Clone)]
pub struct ScoreAccumulator<'c> {
    config: &'c EngineConfig,
    scores: ArchetypeVector,
    contributions: Vec<FeatureContribution>,
}

impl<'c> ScoreAccumulator<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self {
            config,
            scores: ArchetypeVector::zero(),
            contributions: Vec::new(),
        }
    }

    /// Current raw scores.
    pub fn scores(&self) -> &ArchetypeVector {
        &self.scores
    }

    /// Every contribution so far, in application order.
    pub fn contributions(&self) -> &[FeatureContribution] {
        &self.contributions
    }

    /// Scale a feature's base delta for the given conditions.
    pub fn scaled_delta(&self, feature: FeatureId, ctx: &ScalingContext) -> ArchetypeVector {
        let spec = feature.spec();
        let mut delta = spec.base;

        if ctx.learning_regime {
            delta.scale(self.config.competence.damp);
        }

        let opportunity = &self.config.opportunity;
        if !ctx.opportunities.has_unknowns() {
            delta.scale_component(Archetype::Knowledge, opportunity.no_unknowns_knowledge);
        }
        if !ctx.opportunities.instability_enabled {
            delta.scale_component(Archetype::Nurturing, opportunity.no_instability_nurturing);
        }
        if spec.family == FeatureFamily::Keystone && !ctx.opportunities.has_corks() {
            delta.scale(opportunity.no_corks_keystone);
        }

        delta.scaled(spec.trigger.weight())
    }

    /// Decay the scores, then add the scaled delta of `feature` and record it.
    pub fn apply(
        &mut self,
        feature: FeatureId,
        ctx: &ScalingContext,
        note: impl Into<String>,
    ) -> &FeatureContribution {
        let bound = self.config.score_bound;

        self.scores.scale(self.config.decay);
        self.scores.clamp(bound);

        let delta = self.scaled_delta(feature, ctx);
        self.scores.add(&delta);
        self.scores.clamp(bound);

        let contribution = FeatureContribution::new(feature, delta, note);
        tracing::debug!(
            feature = %feature,
            magnitude = contribution.magnitude,
            learning = ctx.learning_regime,
            "applied feature"
        );

        self.contributions.push(contribution);
        &self.contributions[self.contributions.len() - 1]
    }

    /// Final scores and the full contribution log.
    pub fn into_parts(self) -> (ArchetypeVector, Vec<FeatureContribution>) {
        (self.scores, self.contributions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_context() -> ScalingContext {
        ScalingContext {
            learning_regime: false,
            opportunities: OpportunityContext {
                sealed_unknown_count: 2,
                corked_count: 1,
                instability_enabled: true,
            },
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn test_event_weight_only_with_full_context() {
        let config = EngineConfig::default();
        let acc = ScoreAccumulator::new(&config);

        let delta = acc.scaled_delta(FeatureId::InstabilityFastReset, &full_context());

        assert_close(delta.action, 0.6 * 1.5);
        assert_close(delta.nurturing, 2.2 * 1.5);
        assert_close(delta.blueprint, 0.0);
    }

    #[test]
    fn test_learning_regime_damps_everything() {
        let config = EngineConfig::default();
        let acc = ScoreAccumulator::new(&config);
        let ctx = ScalingContext {
            learning_regime: true,
            ..full_context()
        };

        let delta = acc.scaled_delta(FeatureId::LowIllegalRate, &ctx);

        assert_close(delta.blueprint, 2.0 * 0.35 * 0.5);
        assert_close(delta.knowledge, 0.4 * 0.35 * 0.5);
    }

    #[test]
    fn test_opportunity_scaling() {
        let config = EngineConfig::default();
        let acc = ScoreAccumulator::new(&config);
        let ctx = ScalingContext {
            learning_regime: false,
            opportunities: OpportunityContext {
                sealed_unknown_count: 0,
                corked_count: 0,
                instability_enabled: false,
            },
        };

        let reveal = acc.scaled_delta(FeatureId::EarlyReveals, &ctx);
        assert_close(reveal.knowledge, 1.8 * 0.6 * 1.2);
        assert_close(reveal.action, 0.4 * 1.2);

        let reset = acc.scaled_delta(FeatureId::InstabilityMeasuredReset, &ctx);
        assert_close(reset.nurturing, 1.4 * 0.5 * 1.5);
        assert_close(reset.blueprint, 0.6 * 1.5);

        // Keystone family: knowledge is scaled twice, everything by the cork damp
        let cork = acc.scaled_delta(FeatureId::CorkUnlockKeystone, &ctx);
        assert_close(cork.blueprint, 1.2 * 0.4 * 1.8);
        assert_close(cork.knowledge, 1.0 * 0.6 * 0.4 * 1.8);
    }

    #[test]
    fn test_apply_decays_before_adding() {
        let config = EngineConfig::default();
        let mut acc = ScoreAccumulator::new(&config);
        let ctx = full_context();

        acc.apply(FeatureId::LowIllegalRate, &ctx, "first");
        assert_close(acc.scores().blueprint, 1.0);

        acc.apply(FeatureId::LowIllegalRate, &ctx, "second");
        assert_close(acc.scores().blueprint, 1.0 * 0.985 + 1.0);
        assert_eq!(acc.contributions().len(), 2);
    }

    #[test]
    fn test_contribution_magnitude() {
        let config = EngineConfig::default();
        let mut acc = ScoreAccumulator::new(&config);

        let contribution = acc.apply(FeatureId::InstabilityCollapse, &full_context(), "collapse");

        assert_close(contribution.magnitude, (0.6 + 1.2 + 1.0) * 1.5);
        assert_eq!(contribution.note, "collapse");
        assert_eq!(contribution.feature, FeatureId::InstabilityCollapse);
    }

    #[test]
    fn test_scores_stay_clamped() {
        let config = EngineConfig::default();
        let mut acc = ScoreAccumulator::new(&config);
        let ctx = full_context();

        for _ in 0..5_000 {
            acc.apply(FeatureId::InstabilityFastReset, &ctx, "");
            for (_, value) in acc.scores().iter() {
                assert!((-30.0..=30.0).contains(&value));
            }
        }
    }
}
