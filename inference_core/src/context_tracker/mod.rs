//! Opportunity Context Tracker - which mechanics the current level actually offers.
//!
//! A level's context is established by its `level_start` event and holds until the next
//! one. Along with the context, the tracker owns every per-level counter the feature
//! passes read; all of them reset together when a new level starts.

mod counters;

pub use counters::*;

use std::collections::BTreeMap;

use game_telemetry::{EventPayload, LevelBand};
use serde::{Deserialize, Serialize};

/// Mechanics physically present in the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityContext {
    pub sealed_unknown_count: u32,
    pub corked_count: u32,
    pub instability_enabled: bool,
}

impl Default for OpportunityContext {
    fn default() -> Self {
        Self {
            sealed_unknown_count: 0,
            corked_count: 0,
            instability_enabled: true,
        }
    }
}

impl OpportunityContext {
    pub fn has_unknowns(&self) -> bool {
        self.sealed_unknown_count > 0
    }

    pub fn has_corks(&self) -> bool {
        self.corked_count > 0
    }
}

/// Everything the engine remembers about the level in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelState {
    /// Level number from `level_start`, if reported.
    pub level: Option<u32>,
    pub opportunities: OpportunityContext,

    pub reveals: u32,
    /// Reveals that happened before any instability event in this level.
    pub early_reveals: u32,
    pub sealed_unknown_touched: bool,

    /// Any instability event (warning, reset, collapse) seen.
    pub instability_seen: bool,
    /// An instability warning specifically was seen.
    pub instability_warned: bool,
    /// Vessel index -> move index of its outstanding warning.
    pub pending_warnings: BTreeMap<u32, i64>,

    /// Move index of the first deco key use.
    pub key_first_use: Option<i64>,

    pub keystone_solve_move: Option<i64>,
    /// Instability flag reported with the keystone solve.
    pub keystone_instability_active: Option<bool>,

    pub undo_count: Option<u32>,

    highest_move: Option<i64>,
    pour_executes: u32,
}

impl LevelState {
    /// Fresh state for a level starting with the given context.
    pub fn begin(level: Option<u32>, opportunities: OpportunityContext) -> Self {
        Self {
            level,
            opportunities,
            ..Self::default()
        }
    }

    pub fn band(&self) -> LevelBand {
        LevelBand::from_level(self.level)
    }

    /// Moves played so far: the highest reported move index, or the number of executed
    /// pours if that is larger.
    pub fn moves_elapsed(&self) -> i64 {
        self.highest_move
            .unwrap_or(0)
            .max(i64::from(self.pour_executes))
    }

    fn observe_move(&mut self, move_index: Option<i64>) {
        if let Some(m) = move_index {
            self.highest_move = Some(self.highest_move.map_or(m, |h| h.max(m)));
        }
    }
}

/// Tracks the current level and its opportunity context across the event stream.
#[derive(Debug, Clone, Default)]
pub struct ContextTracker {
    current: LevelState,
    levels_started: u32,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update level bookkeeping for one event.
    ///
    /// `level_start` replaces the whole level state; every other kind only contributes
    /// move progress.
    pub fn observe(&mut self, payload: &EventPayload) {
        match payload {
            EventPayload::LevelStart {
                level,
                sealed_unknown_count,
                corked_count,
                instability_enabled,
            } => {
                let opportunities = OpportunityContext {
                    sealed_unknown_count: sealed_unknown_count.unwrap_or(0),
                    corked_count: corked_count.unwrap_or(0),
                    instability_enabled: instability_enabled.unwrap_or(true),
                };
                self.current = LevelState::begin(*level, opportunities);
                self.levels_started += 1;
            }
            EventPayload::PourExecute { move_index } => {
                self.current.pour_executes += 1;
                self.current.observe_move(*move_index);
            }
            other => self.current.observe_move(other.move_index()),
        }
    }

    pub fn current(&self) -> &LevelState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut LevelState {
        &mut self.current
    }

    pub fn opportunities(&self) -> OpportunityContext {
        self.current.opportunities
    }

    /// Number of `level_start` events seen.
    pub fn levels_started(&self) -> u32 {
        self.levels_started
    }
}
