//! Score accumulation and probability conversion.

mod accumulator;

pub use accumulator::*;

use game_telemetry::{Archetype, ArchetypeVector};

/// Temperature-scaled softmax over raw scores.
///
/// The maximum is subtracted before exponentiating, so any finite input yields
/// finite probabilities that sum to one.
pub fn softmax(scores: &ArchetypeVector, temperature: f64) -> ArchetypeVector {
    let max = scores.max_value();
    let exps = scores.map(|s| ((s - max) / temperature).exp());
    let total = exps.sum();
    exps.map(|e| e / total)
}

/// Shannon entropy divided by `ln(4)`, in `[0, 1]`.
pub fn normalized_entropy(probabilities: &ArchetypeVector) -> f64 {
    let entropy: f64 = probabilities
        .iter()
        .map(|(_, p)| p)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.ln())
        .sum();
    (entropy / (Archetype::ALL.len() as f64).ln()).clamp(0.0, 1.0)
}
