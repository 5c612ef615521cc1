//! Streaming Feature Evaluator - single pass over the normalized event sequence.

use game_telemetry::{EventPayload, TelemetryEvent, UnlockMethod};

use super::{FeatureId, InferenceState};

/// Reset within this many moves of the warning.
const FAST_RESET_MAX_MOVES: i64 = 2;
/// Reset within this many moves counts as measured rather than slow.
const MEASURED_RESET_MAX_MOVES: i64 = 5;

impl InferenceState<'_> {
    /// Fold one event into the state, applying any feature it triggers on its own.
    pub fn observe(&mut self, event: &TelemetryEvent) {
        let payload = &event.payload;
        self.counters.record(payload.kind());
        self.tracker.observe(payload);

        match payload {
            EventPayload::LevelStart { .. } | EventPayload::PourExecute { .. } => {}

            EventPayload::BottleSelect { sealed_unknown, .. } => {
                if *sealed_unknown == Some(true) {
                    self.tracker.current_mut().sealed_unknown_touched = true;
                }
            }

            EventPayload::PourAttempt { legal, .. } => {
                self.counters.record_pour_attempt(*legal);
            }

            EventPayload::UnknownReveal { .. } => {
                let level = self.tracker.current_mut();
                level.reveals += 1;
                if !level.instability_seen {
                    level.early_reveals += 1;
                }
                level.sealed_unknown_touched = true;
            }

            EventPayload::InstabilityWarning {
                move_index,
                vessel_index,
            } => {
                let level = self.tracker.current_mut();
                level.instability_seen = true;
                level.instability_warned = true;
                if let (Some(vessel), Some(m)) = (vessel_index, move_index) {
                    level.pending_warnings.insert(*vessel, *m);
                }
            }

            EventPayload::InstabilityReset {
                move_index,
                vessel_index,
            } => {
                let level = self.tracker.current_mut();
                level.instability_seen = true;
                let Some(vessel) = *vessel_index else {
                    return;
                };
                let warned_at = level.pending_warnings.remove(&vessel);
                if let Some(dt) = warned_at.zip(*move_index).and_then(|(w, m)| m.checked_sub(w)) {
                    self.apply_reset(vessel, dt);
                }
            }

            EventPayload::InstabilityCollapse { vessel_index, .. } => {
                self.tracker.current_mut().instability_seen = true;
                let note = match vessel_index {
                    Some(vessel) => format!("vessel {vessel} collapsed"),
                    None => "a vessel collapsed".to_string(),
                };
                self.apply(FeatureId::InstabilityCollapse, note);
            }

            EventPayload::DecoKeyUse { move_index } => {
                let level = self.tracker.current_mut();
                if level.key_first_use.is_none() {
                    level.key_first_use = *move_index;
                }
            }

            EventPayload::CorkUnlock { method, .. } => match method {
                Some(UnlockMethod::Keystone) => {
                    self.apply(FeatureId::CorkUnlockKeystone, "cork opened by solving the keystone");
                }
                Some(UnlockMethod::DecoKey) => {
                    self.apply(FeatureId::CorkUnlockDecoKey, "cork opened with a deco key");
                }
                Some(UnlockMethod::Other) | None => {}
            },

            EventPayload::KeystoneSolved {
                move_index,
                instability_active,
            } => {
                let level = self.tracker.current_mut();
                level.keystone_solve_move = *move_index;
                level.keystone_instability_active = *instability_active;
                if *instability_active == Some(true) {
                    let note = match move_index {
                        Some(m) => format!("keystone solved at move {m} with instability active"),
                        None => "keystone solved with instability active".to_string(),
                    };
                    self.apply(FeatureId::KeystoneUnderInstability, note);
                }
            }

            EventPayload::LevelEnd { undo_count, .. } => {
                self.tracker.current_mut().undo_count = *undo_count;
            }
        }
    }

    /// Classify a warning-to-reset interval. Negative intervals are malformed and ignored.
    fn apply_reset(&mut self, vessel: u32, dt: i64) {
        let feature = if dt < 0 {
            return;
        } else if dt <= FAST_RESET_MAX_MOVES {
            FeatureId::InstabilityFastReset
        } else if dt <= MEASURED_RESET_MAX_MOVES {
            FeatureId::InstabilityMeasuredReset
        } else {
            FeatureId::InstabilitySlowReset
        };
        self.apply(
            feature,
            format!("vessel {vessel} stabilized {dt} moves after its warning"),
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::EngineConfig;

    fn run(config: &EngineConfig, events: serde_json::Value) -> InferenceState<'_> {
        let mut state = InferenceState::new(config);
        for raw in events.as_array().unwrap() {
            state.observe(&TelemetryEvent::from_value(raw).unwrap());
        }
        state
    }

    fn applied(state: &InferenceState<'_>) -> Vec<FeatureId> {
        state
            .accumulator
            .contributions()
            .iter()
            .map(|c| c.feature)
            .collect()
    }

    #[test]
    fn test_reset_bands() {
        let config = EngineConfig::default();
        let state = run(
            &config,
            json!([
                {"kind": "level_start", "sealedUnknownCount": 1, "corkedCount": 1},
                {"kind": "instability_warning", "moveIndex": 10, "vesselIndex": 1},
                {"kind": "instability_reset", "moveIndex": 12, "vesselIndex": 1},
                {"kind": "instability_warning", "moveIndex": 20, "vesselIndex": 2},
                {"kind": "instability_reset", "moveIndex": 23, "vesselIndex": 2},
                {"kind": "instability_warning", "moveIndex": 30, "vesselIndex": 3},
                {"kind": "instability_reset", "moveIndex": 36, "vesselIndex": 3}
            ]),
        );

        assert_eq!(
            applied(&state),
            vec![
                FeatureId::InstabilityFastReset,
                FeatureId::InstabilityMeasuredReset,
                FeatureId::InstabilitySlowReset,
            ]
        );
        assert!(state.tracker.current().pending_warnings.is_empty());
    }

    #[test]
    fn test_reset_without_warning_is_ignored() {
        let config = EngineConfig::default();
        let state = run(
            &config,
            json!([
                {"kind": "instability_warning", "moveIndex": 4, "vesselIndex": 1},
                {"kind": "instability_reset", "moveIndex": 5, "vesselIndex": 2},
                {"kind": "instability_reset", "moveIndex": 6},
                {"kind": "instability_reset", "moveIndex": 2, "vesselIndex": 1}
            ]),
        );

        // Wrong vessel, missing vessel, negative interval
        assert!(applied(&state).is_empty());
        // The negative-interval reset still cleared the warning
        assert!(state.tracker.current().pending_warnings.is_empty());
    }

    #[test]
    fn test_warning_is_cleared_after_reset() {
        let config = EngineConfig::default();
        let state = run(
            &config,
            json!([
                {"kind": "instability_warning", "moveIndex": 1, "vesselIndex": 0},
                {"kind": "instability_reset", "moveIndex": 2, "vesselIndex": 0},
                {"kind": "instability_reset", "moveIndex": 3, "vesselIndex": 0}
            ]),
        );

        assert_eq!(applied(&state), vec![FeatureId::InstabilityFastReset]);
    }

    #[test]
    fn test_extreme_move_indices_are_ignored() {
        let config = EngineConfig::default();
        let state = run(
            &config,
            json!([
                {"kind": "instability_warning", "moveIndex": -1e19, "vesselIndex": 1},
                {"kind": "instability_reset", "moveIndex": 1e19, "vesselIndex": 1},
                {"kind": "instability_warning", "moveIndex": 1e19, "vesselIndex": 2},
                {"kind": "instability_reset", "moveIndex": -1e19, "vesselIndex": 2}
            ]),
        );

        // Both intervals overflow; neither is classified
        assert!(applied(&state).is_empty());
        assert!(state.tracker.current().pending_warnings.is_empty());
    }

    #[test]
    fn test_collapse_and_cork_features() {
        let config = EngineConfig::default();
        let state = run(
            &config,
            json!([
                {"kind": "instability_collapse", "vesselIndex": 3},
                {"kind": "cork_unlock", "method": "keystone"},
                {"kind": "cork_unlock", "method": "deco_key"},
                {"kind": "cork_unlock", "method": "hammer"},
                {"kind": "cork_unlock"}
            ]),
        );

        assert_eq!(
            applied(&state),
            vec![
                FeatureId::InstabilityCollapse,
                FeatureId::CorkUnlockKeystone,
                FeatureId::CorkUnlockDecoKey,
            ]
        );
        assert_eq!(state.accumulator.contributions()[0].note, "vessel 3 collapsed");
    }

    #[test]
    fn test_keystone_under_instability() {
        let config = EngineConfig::default();
        let state = run(
            &config,
            json!([
                {"kind": "keystone_solved", "moveIndex": 9, "instabilityActive": false},
                {"kind": "keystone_solved", "moveIndex": 12},
                {"kind": "keystone_solved", "moveIndex": 15, "instabilityActive": true}
            ]),
        );

        assert_eq!(applied(&state), vec![FeatureId::KeystoneUnderInstability]);
        assert_eq!(state.tracker.current().keystone_solve_move, Some(15));
    }

    #[test]
    fn test_reveal_timing_counters() {
        let config = EngineConfig::default();
        let state = run(
            &config,
            json!([
                {"kind": "level_start", "sealedUnknownCount": 2},
                {"kind": "unknown_reveal", "moveIndex": 2},
                {"kind": "unknown_reveal", "moveIndex": 4},
                {"kind": "instability_collapse", "moveIndex": 5},
                {"kind": "unknown_reveal", "moveIndex": 8}
            ]),
        );

        let level = state.tracker.current();
        assert_eq!(level.reveals, 3);
        assert_eq!(level.early_reveals, 2);
        assert!(level.sealed_unknown_touched);
    }

    #[test]
    fn test_pour_and_key_counters() {
        let config = EngineConfig::default();
        let state = run(
            &config,
            json!([
                {"kind": "pour_attempt", "legal": true},
                {"kind": "pour_attempt", "legal": false},
                {"kind": "pour_attempt"},
                {"kind": "deco_key_use", "moveIndex": 7},
                {"kind": "deco_key_use", "moveIndex": 3},
                {"kind": "bottle_select", "sealedUnknown": true},
                {"kind": "level_end", "undoCount": 4}
            ]),
        );

        assert_eq!(state.counters.pour_attempts, 3);
        assert_eq!(state.counters.illegal_pour_attempts, 1);
        assert_eq!(state.counters.meaningful_events, 5);
        assert_eq!(state.counters.total_events, 7);

        let level = state.tracker.current();
        assert_eq!(level.key_first_use, Some(7));
        assert!(level.sealed_unknown_touched);
        assert_eq!(level.undo_count, Some(4));
    }
}
