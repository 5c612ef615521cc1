//! Telemetry events - what the game loop reports about a play session.
//!
//! Each event kind carries only the fields that are meaningful for it. Every field is
//! optional because producers are allowed to omit anything they could not measure;
//! consumers treat a missing field as "not observed" rather than as an error.
//!
//! Two ways in:
//! - **Typed**: construct [`TelemetryEvent`] directly, or deserialize it with serde.
//! - **Lenient**: [`TelemetryEvent::from_value`] accepts loosely-typed JSON, coercing
//!   numbers and skipping anything it does not recognize.

mod parse;

use serde::{Deserialize, Serialize};

use crate::mechanics::{EventKind, UnlockMethod};

/// A single timestamped telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Producer timestamp. Only used for ordering.
    #[serde(default)]
    pub ts: f64,

    #[serde(flatten)]
    pub payload: EventPayload,
}

/// Kind-specific event data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventPayload {
    LevelStart {
        #[serde(default)]
        level: Option<u32>,
        #[serde(default)]
        sealed_unknown_count: Option<u32>,
        #[serde(default)]
        corked_count: Option<u32>,
        #[serde(default)]
        instability_enabled: Option<bool>,
    },
    BottleSelect {
        #[serde(default)]
        move_index: Option<i64>,
        #[serde(default)]
        vessel_index: Option<u32>,
        /// Whether the selected vessel is still sealed-unknown.
        #[serde(default)]
        sealed_unknown: Option<bool>,
    },
    PourAttempt {
        #[serde(default)]
        move_index: Option<i64>,
        #[serde(default)]
        legal: Option<bool>,
    },
    PourExecute {
        #[serde(default)]
        move_index: Option<i64>,
    },
    UnknownReveal {
        #[serde(default)]
        move_index: Option<i64>,
        #[serde(default)]
        vessel_index: Option<u32>,
    },
    InstabilityWarning {
        #[serde(default)]
        move_index: Option<i64>,
        #[serde(default)]
        vessel_index: Option<u32>,
    },
    InstabilityReset {
        #[serde(default)]
        move_index: Option<i64>,
        #[serde(default)]
        vessel_index: Option<u32>,
    },
    InstabilityCollapse {
        #[serde(default)]
        move_index: Option<i64>,
        #[serde(default)]
        vessel_index: Option<u32>,
    },
    DecoKeyUse {
        #[serde(default)]
        move_index: Option<i64>,
    },
    CorkUnlock {
        #[serde(default)]
        move_index: Option<i64>,
        #[serde(default)]
        method: Option<UnlockMethod>,
    },
    KeystoneSolved {
        #[serde(default)]
        move_index: Option<i64>,
        #[serde(default)]
        instability_active: Option<bool>,
    },
    LevelEnd {
        #[serde(default)]
        move_index: Option<i64>,
        #[serde(default)]
        undo_count: Option<u32>,
    },
}

impl EventPayload {
    /// The discriminator for this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::LevelStart { .. } => EventKind::LevelStart,
            EventPayload::BottleSelect { .. } => EventKind::BottleSelect,
            EventPayload::PourAttempt { .. } => EventKind::PourAttempt,
            EventPayload::PourExecute { .. } => EventKind::PourExecute,
            EventPayload::UnknownReveal { .. } => EventKind::UnknownReveal,
            EventPayload::InstabilityWarning { .. } => EventKind::InstabilityWarning,
            EventPayload::InstabilityReset { .. } => EventKind::InstabilityReset,
            EventPayload::InstabilityCollapse { .. } => EventKind::InstabilityCollapse,
            EventPayload::DecoKeyUse { .. } => EventKind::DecoKeyUse,
            EventPayload::CorkUnlock { .. } => EventKind::CorkUnlock,
            EventPayload::KeystoneSolved { .. } => EventKind::KeystoneSolved,
            EventPayload::LevelEnd { .. } => EventKind::LevelEnd,
        }
    }

    /// The move index, for kinds that report one.
    pub fn move_index(&self) -> Option<i64> {
        match self {
            EventPayload::LevelStart { .. } => None,
            EventPayload::BottleSelect { move_index, .. }
            | EventPayload::PourAttempt { move_index, .. }
            | EventPayload::PourExecute { move_index }
            | EventPayload::UnknownReveal { move_index, .. }
            | EventPayload::InstabilityWarning { move_index, .. }
            | EventPayload::InstabilityReset { move_index, .. }
            | EventPayload::InstabilityCollapse { move_index, .. }
            | EventPayload::DecoKeyUse { move_index }
            | EventPayload::CorkUnlock { move_index, .. }
            | EventPayload::KeystoneSolved { move_index, .. }
            | EventPayload::LevelEnd { move_index, .. } => *move_index,
        }
    }

    /// The vessel index, for kinds that refer to a single vessel.
    pub fn vessel_index(&self) -> Option<u32> {
        match self {
            EventPayload::BottleSelect { vessel_index, .. }
            | EventPayload::UnknownReveal { vessel_index, .. }
            | EventPayload::InstabilityWarning { vessel_index, .. }
            | EventPayload::InstabilityReset { vessel_index, .. }
            | EventPayload::InstabilityCollapse { vessel_index, .. } => *vessel_index,
            _ => None,
        }
    }
}

impl TelemetryEvent {
    /// Create an event at the given timestamp.
    pub fn new(ts: f64, payload: EventPayload) -> Self {
        Self { ts, payload }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Timestamp used for ordering: non-finite values and negative zero become `0.0`.
    pub fn sort_key(&self) -> f64 {
        if self.ts.is_finite() {
            self.ts + 0.0
        } else {
            0.0
        }
    }
}
