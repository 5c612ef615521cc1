//! Behavioral features and their calibrated base deltas.
//!
//! A feature is a named pattern of play. When the streaming evaluator or the aggregate
//! pass detects one, the feature's base delta is scaled and folded into the score vector
//! through the [`ScoreAccumulator`](crate::scoring::ScoreAccumulator).
//!
//! # Feature Families
//!
//! | Family      | Features                                                     |
//! |-------------|--------------------------------------------------------------|
//! | Instability | fast / measured / slow reset, collapse                       |
//! | Keystone    | cork unlock (keystone or key), keystone under instability, stabilize before keystone |
//! | Competence  | low / high illegal rate                                      |
//! | Reveal      | early / late reveals, unknown avoidance                      |
//! | Key         | early / late key                                             |
//! | Refinement  | undo refinement                                              |
//!
//! Keystone-family features are damped when the level has nothing corked.
//!
//! The table below is data, not logic: adding a feature means adding a variant and a row.

mod aggregate;
mod state;
mod streaming;

pub use state::*;

use game_telemetry::{ArchetypeVector, EventKind};
use serde::{Deserialize, Serialize};

/// Identifier of every scored feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureId {
    InstabilityFastReset,
    InstabilityMeasuredReset,
    InstabilitySlowReset,
    InstabilityCollapse,
    CorkUnlockKeystone,
    CorkUnlockDecoKey,
    KeystoneUnderInstability,
    LowIllegalRate,
    HighIllegalRate,
    EarlyReveals,
    LateReveals,
    UnknownAvoidance,
    EarlyKey,
    LateKey,
    StabilizeBeforeKeystone,
    UndoRefinement,
}

/// Grouping used by opportunity scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFamily {
    Instability,
    Keystone,
    Competence,
    Reveal,
    Key,
    Refinement,
}

/// Static description of a feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    pub id: FeatureId,
    pub family: FeatureFamily,
    /// Event kind whose weight scales this feature.
    pub trigger: EventKind,
    /// Unscaled delta in Blueprint, Action, Nurturing, Knowledge order.
    pub base: ArchetypeVector,
}

const fn spec(
    id: FeatureId,
    family: FeatureFamily,
    trigger: EventKind,
    base: [f64; 4],
) -> FeatureSpec {
    FeatureSpec {
        id,
        family,
        trigger,
        base: ArchetypeVector::new(base[0], base[1], base[2], base[3]),
    }
}

use EventKind as K;
use FeatureFamily as F;
use FeatureId as Id;

/// Indexed by `FeatureId as usize`.
#[rustfmt::skip]
static FEATURE_TABLE: [FeatureSpec; FeatureId::COUNT] = [
    //    id                            family          trigger                 B     A     N     K
    spec(Id::InstabilityFastReset,     F::Instability, K::InstabilityReset,    [ 0.0,  0.6,  2.2,  0.0]),
    spec(Id::InstabilityMeasuredReset, F::Instability, K::InstabilityReset,    [ 0.6,  0.0,  1.4,  0.2]),
    spec(Id::InstabilitySlowReset,     F::Instability, K::InstabilityReset,    [ 0.2,  0.8, -0.8,  0.0]),
    spec(Id::InstabilityCollapse,      F::Instability, K::InstabilityCollapse, [-0.6,  1.2, -1.0,  0.0]),
    spec(Id::CorkUnlockKeystone,       F::Keystone,    K::CorkUnlock,          [ 1.2,  0.0,  0.0,  1.0]),
    spec(Id::CorkUnlockDecoKey,        F::Keystone,    K::CorkUnlock,          [ 0.0,  1.4,  0.0,  0.2]),
    spec(Id::KeystoneUnderInstability, F::Keystone,    K::KeystoneSolved,      [ 0.0,  1.6, -0.4,  0.4]),
    spec(Id::LowIllegalRate,           F::Competence,  K::PourAttempt,         [ 2.0,  0.0,  0.0,  0.4]),
    spec(Id::HighIllegalRate,          F::Competence,  K::PourAttempt,         [-1.2,  1.6,  0.0, -0.4]),
    spec(Id::EarlyReveals,             F::Reveal,      K::UnknownReveal,       [ 0.0,  0.4,  0.0,  1.8]),
    spec(Id::LateReveals,              F::Reveal,      K::UnknownReveal,       [ 0.8,  0.0,  0.4, -0.4]),
    spec(Id::UnknownAvoidance,         F::Reveal,      K::LevelStart,          [ 0.6,  0.0,  0.2, -1.4]),
    spec(Id::EarlyKey,                 F::Key,         K::DecoKeyUse,          [ 0.0,  1.6,  0.0,  0.0]),
    spec(Id::LateKey,                  F::Key,         K::DecoKeyUse,          [ 1.0,  0.0,  0.4,  0.0]),
    spec(Id::StabilizeBeforeKeystone,  F::Keystone,    K::KeystoneSolved,      [ 0.8,  0.0,  1.6,  0.0]),
    spec(Id::UndoRefinement,           F::Refinement,  K::LevelEnd,            [ 1.4, -0.4,  0.0,  0.4]),
];

impl FeatureId {
    pub const COUNT: usize = 16;

    /// All features, in table order.
    pub const ALL: [FeatureId; FeatureId::COUNT] = [
        Id::InstabilityFastReset,
        Id::InstabilityMeasuredReset,
        Id::InstabilitySlowReset,
        Id::InstabilityCollapse,
        Id::CorkUnlockKeystone,
        Id::CorkUnlockDecoKey,
        Id::KeystoneUnderInstability,
        Id::LowIllegalRate,
        Id::HighIllegalRate,
        Id::EarlyReveals,
        Id::LateReveals,
        Id::UnknownAvoidance,
        Id::EarlyKey,
        Id::LateKey,
        Id::StabilizeBeforeKeystone,
        Id::UndoRefinement,
    ];

    pub fn spec(self) -> &'static FeatureSpec {
        &FEATURE_TABLE[self as usize]
    }

    pub fn family(self) -> FeatureFamily {
        self.spec().family
    }

    pub fn trigger(self) -> EventKind {
        self.spec().trigger
    }

    pub fn base_delta(self) -> ArchetypeVector {
        self.spec().base
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Id::InstabilityFastReset => "instability_fast_reset",
            Id::InstabilityMeasuredReset => "instability_measured_reset",
            Id::InstabilitySlowReset => "instability_slow_reset",
            Id::InstabilityCollapse => "instability_collapse",
            Id::CorkUnlockKeystone => "cork_unlock_keystone",
            Id::CorkUnlockDecoKey => "cork_unlock_deco_key",
            Id::KeystoneUnderInstability => "keystone_under_instability",
            Id::LowIllegalRate => "low_illegal_rate",
            Id::HighIllegalRate => "high_illegal_rate",
            Id::EarlyReveals => "early_reveals",
            Id::LateReveals => "late_reveals",
            Id::UnknownAvoidance => "unknown_avoidance",
            Id::EarlyKey => "early_key",
            Id::LateKey => "late_key",
            Id::StabilizeBeforeKeystone => "stabilize_before_keystone",
            Id::UndoRefinement => "undo_refinement",
        }
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
