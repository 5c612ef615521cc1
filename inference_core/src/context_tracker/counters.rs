//! Run-wide counters that span level boundaries.

use game_telemetry::EventKind;

use crate::config::CompetenceGate;

/// Totals accumulated over the whole event log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub total_events: u64,
    /// Events whose kind carries behavioral signal.
    pub meaningful_events: u64,
    pub pour_attempts: u64,
    pub illegal_pour_attempts: u64,
}

impl RunCounters {
    /// Count one event of the given kind.
    pub fn record(&mut self, kind: EventKind) {
        self.total_events += 1;
        if kind.is_signal_bearing() {
            self.meaningful_events += 1;
        }
    }

    /// Count one pour attempt. Only an explicit `legal: false` counts as illegal.
    pub fn record_pour_attempt(&mut self, legal: Option<bool>) {
        self.pour_attempts += 1;
        if legal == Some(false) {
            self.illegal_pour_attempts += 1;
        }
    }

    /// Share of pour attempts that were illegal; `0.0` with no attempts.
    pub fn illegal_rate(&self) -> f64 {
        if self.pour_attempts == 0 {
            0.0
        } else {
            self.illegal_pour_attempts as f64 / self.pour_attempts as f64
        }
    }

    /// Too few attempts or too many mistakes to trust the signal yet.
    pub fn in_learning_regime(&self, gate: &CompetenceGate) -> bool {
        self.pour_attempts < gate.min_pour_attempts || self.illegal_rate() > gate.max_illegal_rate
    }
}
