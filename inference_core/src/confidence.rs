//! Confidence Estimator.
//!
//! Confidence is the product of three terms:
//! - **volume**: `ln(1 + m) / ln(1 + saturation)`, where `m` counts meaningful events
//! - **competence**: `1 - penalty * illegal_rate`
//! - **separation**: `floor + (1 - floor) * (1 - normalized_entropy)`
//!
//! Runs in the learning regime are capped regardless of the product.

use game_telemetry::ArchetypeVector;

use crate::config::ConfidenceConfig;
use crate::scoring::normalized_entropy;

/// Run statistics the estimate depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    pub meaningful_events: u64,
    pub illegal_rate: f64,
    pub learning_regime: bool,
}

/// Confidence in `[0, 1]` for the given probabilities.
pub fn estimate(
    probabilities: &ArchetypeVector,
    inputs: &ConfidenceInputs,
    config: &ConfidenceConfig,
) -> f64 {
    let volume = ((inputs.meaningful_events as f64).ln_1p()
        / (config.saturation_events as f64).ln_1p())
    .clamp(0.0, 1.0);
    let competence = (1.0 - config.illegal_penalty * inputs.illegal_rate).clamp(0.0, 1.0);
    let separation = 1.0 - normalized_entropy(probabilities);

    let floor = config.separation_floor;
    let mut confidence = volume * competence * (floor + (1.0 - floor) * separation);
    if inputs.learning_regime {
        confidence = confidence.min(config.learning_cap);
    }
    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(meaningful_events: u64, illegal_rate: f64, learning_regime: bool) -> ConfidenceInputs {
        ConfidenceInputs {
            meaningful_events,
            illegal_rate,
            learning_regime,
        }
    }

    #[test]
    fn test_no_events_no_confidence() {
        let c = estimate(
            &ArchetypeVector::splat(0.25),
            &inputs(0, 0.0, true),
            &ConfidenceConfig::default(),
        );
        assert_eq!(c, 0.0);
    }

    #[test]
    fn test_uniform_probabilities_use_floor() {
        let c = estimate(
            &ArchetypeVector::splat(0.25),
            &inputs(120, 0.0, false),
            &ConfidenceConfig::default(),
        );
        assert!((c - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_volume_saturates() {
        let config = ConfidenceConfig::default();
        let p = ArchetypeVector::new(1.0, 0.0, 0.0, 0.0);

        let saturated = estimate(&p, &inputs(120, 0.0, false), &config);
        let beyond = estimate(&p, &inputs(10_000, 0.0, false), &config);

        assert!((saturated - 1.0).abs() < 1e-9);
        assert!((beyond - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_illegal_rate_erodes_competence() {
        let config = ConfidenceConfig::default();
        let p = ArchetypeVector::new(1.0, 0.0, 0.0, 0.0);

        let half = estimate(&p, &inputs(120, 0.2, false), &config);
        assert!((half - 0.7).abs() < 1e-9);

        let none = estimate(&p, &inputs(120, 0.9, false), &config);
        assert_eq!(none, 0.0);
    }

    #[test]
    fn test_learning_regime_cap() {
        let c = estimate(
            &ArchetypeVector::new(1.0, 0.0, 0.0, 0.0),
            &inputs(120, 0.0, true),
            &ConfidenceConfig::default(),
        );
        assert!((c - 0.45).abs() < 1e-12);
    }
}
