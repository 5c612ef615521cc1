//! Aggregate Feature Pass - features that need the whole log.
//!
//! Run-wide statistics (pour legality) span every level; level-scoped statistics come
//! from the last level in the log.

use super::{FeatureId, InferenceState};

const LOW_ILLEGAL_RATE: f64 = 0.05;
const HIGH_ILLEGAL_RATE: f64 = 0.20;
const EARLY_REVEAL_RATIO: f64 = 0.6;
const LATE_REVEAL_RATIO: f64 = 0.3;
const AVOIDANCE_MIN_MOVES: i64 = 10;
/// First key use before this share of the expected solve length counts as early.
const EARLY_KEY_FRACTION: f64 = 0.2;
const REFINEMENT_MIN_UNDOS: u32 = 3;
const REFINEMENT_MAX_ILLEGAL_RATE: f64 = 0.10;

impl InferenceState<'_> {
    /// Evaluate every whole-log feature once, in a fixed order.
    pub fn run_aggregate_pass(&mut self) {
        self.illegal_rate_bands();
        self.reveal_timing();
        self.unknown_avoidance();
        self.key_timing();
        self.stabilize_before_keystone();
        self.undo_refinement();
    }

    fn illegal_rate_bands(&mut self) {
        let attempts = self.counters.pour_attempts;
        if attempts < self.config.competence.min_pour_attempts {
            return;
        }

        let rate = self.counters.illegal_rate();
        let note = format!("illegal rate {rate:.2} over {attempts} pour attempts");
        if rate < LOW_ILLEGAL_RATE {
            self.apply(FeatureId::LowIllegalRate, note.clone());
        }
        if rate > HIGH_ILLEGAL_RATE {
            self.apply(FeatureId::HighIllegalRate, note);
        }
    }

    fn reveal_timing(&mut self) {
        let level = self.tracker.current();
        if level.reveals == 0 {
            return;
        }

        let ratio = f64::from(level.early_reveals) / f64::from(level.reveals);
        let note = format!(
            "{} of {} reveals before any instability",
            level.early_reveals, level.reveals
        );
        if ratio >= EARLY_REVEAL_RATIO {
            self.apply(FeatureId::EarlyReveals, note);
        } else if ratio <= LATE_REVEAL_RATIO {
            self.apply(FeatureId::LateReveals, note);
        }
    }

    fn unknown_avoidance(&mut self) {
        let level = self.tracker.current();
        let moves = level.moves_elapsed();
        if level.opportunities.has_unknowns()
            && !level.sealed_unknown_touched
            && moves >= AVOIDANCE_MIN_MOVES
        {
            let note = format!(
                "{} sealed vessels left untouched for {moves} moves",
                level.opportunities.sealed_unknown_count
            );
            self.apply(FeatureId::UnknownAvoidance, note);
        }
    }

    fn key_timing(&mut self) {
        let level = self.tracker.current();
        let Some(first_use) = level.key_first_use else {
            return;
        };

        let band = level.band();
        let expected = band.expected_solve_length();
        let feature = if (first_use as f64) < EARLY_KEY_FRACTION * f64::from(expected) {
            FeatureId::EarlyKey
        } else {
            FeatureId::LateKey
        };
        let note = format!("first key at move {first_use} of ~{expected} expected ({band} band)");
        self.apply(feature, note);
    }

    fn stabilize_before_keystone(&mut self) {
        let level = self.tracker.current();
        if level.instability_warned && level.keystone_instability_active == Some(false) {
            let note = match level.keystone_solve_move {
                Some(m) => format!("instability settled before keystone solve at move {m}"),
                None => "instability settled before keystone solve".to_string(),
            };
            self.apply(FeatureId::StabilizeBeforeKeystone, note);
        }
    }

    fn undo_refinement(&mut self) {
        let undos = self.tracker.current().undo_count.unwrap_or(0);
        let rate = self.counters.illegal_rate();
        if undos >= REFINEMENT_MIN_UNDOS && rate < REFINEMENT_MAX_ILLEGAL_RATE {
            self.apply(
                FeatureId::UndoRefinement,
                format!("{undos} undos with illegal rate {rate:.2}"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use game_telemetry::{EventLog, EventPayload, TelemetryEvent};
    use serde_json::json;

    use super::*;
    use crate::config::EngineConfig;

    fn run(config: &EngineConfig, events: serde_json::Value) -> Vec<FeatureId> {
        let log = EventLog::from_value(&events).unwrap();
        let mut state = InferenceState::new(config);
        for event in log.events() {
            state.observe(event);
        }
        let streamed = state.accumulator.contributions().len();
        state.run_aggregate_pass();
        state.accumulator.contributions()[streamed..]
            .iter()
            .map(|c| c.feature)
            .collect()
    }

    fn pours(legal: usize, illegal: usize) -> Vec<serde_json::Value> {
        let mut events = Vec::new();
        for i in 0..legal + illegal {
            events.push(json!({"kind": "pour_attempt", "ts": i + 1, "legal": i >= illegal}));
        }
        events
    }

    #[test]
    fn test_illegal_rate_needs_samples() {
        let config = EngineConfig::default();
        assert!(run(&config, json!(pours(11, 0))).is_empty());
        assert_eq!(run(&config, json!(pours(12, 0))), vec![FeatureId::LowIllegalRate]);
    }

    #[test]
    fn test_high_illegal_rate() {
        let config = EngineConfig::default();
        // 4 / 12 = 0.33
        assert_eq!(run(&config, json!(pours(8, 4))), vec![FeatureId::HighIllegalRate]);
        // 1 / 12 = 0.083, neither band
        assert!(run(&config, json!(pours(11, 1))).is_empty());
    }

    #[test]
    fn test_reveal_timing_ratio() {
        let config = EngineConfig::default();

        let early = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "sealedUnknownCount": 2},
                {"kind": "unknown_reveal", "ts": 1},
                {"kind": "unknown_reveal", "ts": 2},
                {"kind": "instability_warning", "ts": 3},
                {"kind": "unknown_reveal", "ts": 4}
            ]),
        );
        assert_eq!(early, vec![FeatureId::EarlyReveals]);

        let late = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "sealedUnknownCount": 2},
                {"kind": "instability_warning", "ts": 1},
                {"kind": "unknown_reveal", "ts": 2},
                {"kind": "unknown_reveal", "ts": 3}
            ]),
        );
        assert_eq!(late, vec![FeatureId::LateReveals]);

        // 1 of 2 is between the bands
        let middle = run(
            &config,
            json!([
                {"kind": "unknown_reveal", "ts": 1},
                {"kind": "instability_collapse", "ts": 2},
                {"kind": "unknown_reveal", "ts": 3}
            ]),
        );
        assert!(!middle.contains(&FeatureId::EarlyReveals));
        assert!(!middle.contains(&FeatureId::LateReveals));
    }

    #[test]
    fn test_unknown_avoidance() {
        let config = EngineConfig::default();

        let avoided = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "sealedUnknownCount": 2},
                {"kind": "bottle_select", "ts": 1, "moveIndex": 3, "sealedUnknown": false},
                {"kind": "pour_execute", "ts": 2, "moveIndex": 10}
            ]),
        );
        assert_eq!(avoided, vec![FeatureId::UnknownAvoidance]);

        let touched = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "sealedUnknownCount": 2},
                {"kind": "bottle_select", "ts": 1, "moveIndex": 3, "sealedUnknown": true},
                {"kind": "pour_execute", "ts": 2, "moveIndex": 10}
            ]),
        );
        assert!(touched.is_empty());

        let too_short = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "sealedUnknownCount": 2},
                {"kind": "pour_execute", "ts": 2, "moveIndex": 9}
            ]),
        );
        assert!(too_short.is_empty());

        let nothing_sealed = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "sealedUnknownCount": 0},
                {"kind": "pour_execute", "ts": 2, "moveIndex": 30}
            ]),
        );
        assert!(nothing_sealed.is_empty());
    }

    #[test]
    fn test_key_timing_uses_level_band() {
        let config = EngineConfig::default();

        // Early band expects 28 moves: 20% is 5.6
        let early = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "level": 3},
                {"kind": "deco_key_use", "ts": 1, "moveIndex": 5}
            ]),
        );
        assert_eq!(early, vec![FeatureId::EarlyKey]);

        let late = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "level": 3},
                {"kind": "deco_key_use", "ts": 1, "moveIndex": 6}
            ]),
        );
        assert_eq!(late, vec![FeatureId::LateKey]);

        // Infinite band expects 72 moves: 20% is 14.4
        let infinite = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "level": 40},
                {"kind": "deco_key_use", "ts": 1, "moveIndex": 14}
            ]),
        );
        assert_eq!(infinite, vec![FeatureId::EarlyKey]);

        let no_index = run(&config, json!([{"kind": "deco_key_use", "ts": 1}]));
        assert!(no_index.is_empty());
    }

    #[test]
    fn test_stabilize_before_keystone() {
        let config = EngineConfig::default();

        let stabilized = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0, "corkedCount": 1},
                {"kind": "instability_warning", "ts": 1, "moveIndex": 4, "vesselIndex": 1},
                {"kind": "keystone_solved", "ts": 2, "moveIndex": 9, "instabilityActive": false}
            ]),
        );
        assert_eq!(stabilized, vec![FeatureId::StabilizeBeforeKeystone]);

        let unflagged = run(
            &config,
            json!([
                {"kind": "instability_warning", "ts": 1, "moveIndex": 4, "vesselIndex": 1},
                {"kind": "keystone_solved", "ts": 2, "moveIndex": 9}
            ]),
        );
        assert!(unflagged.is_empty());

        let never_warned = run(
            &config,
            json!([{"kind": "keystone_solved", "ts": 2, "instabilityActive": false}]),
        );
        assert!(never_warned.is_empty());
    }

    #[test]
    fn test_undo_refinement() {
        let config = EngineConfig::default();

        let refined = run(&config, json!([{"kind": "level_end", "ts": 1, "undoCount": 3}]));
        assert_eq!(refined, vec![FeatureId::UndoRefinement]);

        let few = run(&config, json!([{"kind": "level_end", "ts": 1, "undoCount": 2}]));
        assert!(few.is_empty());

        // 1 illegal of 5 = 0.2
        let mut sloppy = pours(4, 1);
        sloppy.push(json!({"kind": "level_end", "ts": 99, "undoCount": 5}));
        assert!(run(&config, json!(sloppy)).is_empty());
    }

    #[test]
    fn test_level_scope_is_last_level() {
        let config = EngineConfig::default();
        let features = run(
            &config,
            json!([
                {"kind": "level_start", "ts": 0},
                {"kind": "level_end", "ts": 1, "undoCount": 6},
                {"kind": "level_start", "ts": 2}
            ]),
        );
        assert!(features.is_empty());
    }

    #[test]
    fn test_aggregate_applies_through_accumulator() {
        let config = EngineConfig::default();
        let mut state = InferenceState::new(&config);
        state.observe(&TelemetryEvent::new(
            0.0,
            EventPayload::LevelStart {
                level: Some(1),
                sealed_unknown_count: None,
                corked_count: None,
                instability_enabled: None,
            },
        ));
        for i in 0..20 {
            state.observe(&TelemetryEvent::new(
                f64::from(i),
                EventPayload::PourAttempt {
                    move_index: Some(i64::from(i)),
                    legal: Some(true),
                },
            ));
        }
        state.run_aggregate_pass();

        let contributions = state.accumulator.contributions();
        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].feature, FeatureId::LowIllegalRate);
        assert!((state.accumulator.scores().blueprint - 1.0).abs() < 1e-12);
    }
}
