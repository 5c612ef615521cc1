//! Lenient parsing of loosely-typed JSON events.

use serde_json::{Map, Value};

use super::{EventPayload, TelemetryEvent};
use crate::mechanics::{EventKind, UnlockMethod};

const TIMESTAMP_KEYS: &[&str] = &["ts", "t"];
const LEVEL_KEYS: &[&str] = &["level", "levelId", "level_id"];
const MOVE_KEYS: &[&str] = &["moveIndex", "move_index", "move"];
const VESSEL_KEYS: &[&str] = &["vesselIndex", "vessel_index", "vessel", "bottleIndex", "bottle_index"];
const SEALED_COUNT_KEYS: &[&str] = &["sealedUnknownCount", "sealed_unknown_count"];
const CORKED_COUNT_KEYS: &[&str] = &["corkedCount", "corked_count"];
const INSTABILITY_ENABLED_KEYS: &[&str] = &["instabilityEnabled", "instability_enabled"];
const SEALED_FLAG_KEYS: &[&str] = &["sealedUnknown", "sealed_unknown", "isSealedUnknown"];
const LEGAL_KEYS: &[&str] = &["legal", "isLegal", "is_legal"];
const METHOD_KEYS: &[&str] = &["method", "unlockMethod", "unlock_method"];
const INSTABILITY_ACTIVE_KEYS: &[&str] = &["instabilityActive", "instability_active"];
const UNDO_KEYS: &[&str] = &["undoCount", "undo_count", "undos"];

impl TelemetryEvent {
    /// Parse a loosely-typed JSON event.
    ///
    /// Returns `None` for anything that is not an object with a recognized `kind`.
    /// Fields that are missing, mistyped, or non-finite are treated as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let kind = obj.get("kind").and_then(Value::as_str).and_then(EventKind::from_wire)?;

        let ts = number(obj, TIMESTAMP_KEYS).unwrap_or(0.0);
        let fields = Fields(obj);

        let payload = match kind {
            EventKind::LevelStart => EventPayload::LevelStart {
                level: fields.level(),
                sealed_unknown_count: fields.count(SEALED_COUNT_KEYS),
                corked_count: fields.count(CORKED_COUNT_KEYS),
                instability_enabled: fields.flag(INSTABILITY_ENABLED_KEYS),
            },
            EventKind::BottleSelect => EventPayload::BottleSelect {
                move_index: fields.move_index(),
                vessel_index: fields.vessel_index(),
                sealed_unknown: fields.flag(SEALED_FLAG_KEYS),
            },
            EventKind::PourAttempt => EventPayload::PourAttempt {
                move_index: fields.move_index(),
                legal: fields.flag(LEGAL_KEYS),
            },
            EventKind::PourExecute => EventPayload::PourExecute {
                move_index: fields.move_index(),
            },
            EventKind::UnknownReveal => EventPayload::UnknownReveal {
                move_index: fields.move_index(),
                vessel_index: fields.vessel_index(),
            },
            EventKind::InstabilityWarning => EventPayload::InstabilityWarning {
                move_index: fields.move_index(),
                vessel_index: fields.vessel_index(),
            },
            EventKind::InstabilityReset => EventPayload::InstabilityReset {
                move_index: fields.move_index(),
                vessel_index: fields.vessel_index(),
            },
            EventKind::InstabilityCollapse => EventPayload::InstabilityCollapse {
                move_index: fields.move_index(),
                vessel_index: fields.vessel_index(),
            },
            EventKind::DecoKeyUse => EventPayload::DecoKeyUse {
                move_index: fields.move_index(),
            },
            EventKind::CorkUnlock => EventPayload::CorkUnlock {
                move_index: fields.move_index(),
                method: fields.text(METHOD_KEYS).map(UnlockMethod::from_wire),
            },
            EventKind::KeystoneSolved => EventPayload::KeystoneSolved {
                move_index: fields.move_index(),
                instability_active: fields.flag(INSTABILITY_ACTIVE_KEYS),
            },
            EventKind::LevelEnd => EventPayload::LevelEnd {
                move_index: fields.move_index(),
                undo_count: fields.count(UNDO_KEYS),
            },
        };

        Some(TelemetryEvent::new(ts, payload))
    }
}

/// Field accessors over a raw event object.
struct Fields<'a>(&'a Map<String, Value>);

impl Fields<'_> {
    fn move_index(&self) -> Option<i64> {
        number(self.0, MOVE_KEYS).map(|n| n.trunc() as i64)
    }

    fn vessel_index(&self) -> Option<u32> {
        self.count(VESSEL_KEYS)
    }

    /// Non-negative integer. Negative values are treated as absent.
    fn count(&self, keys: &[&str]) -> Option<u32> {
        number(self.0, keys)
            .filter(|n| *n >= 0.0)
            .map(|n| n.trunc().min(u32::MAX as f64) as u32)
    }

    fn flag(&self, keys: &[&str]) -> Option<bool> {
        match first(self.0, keys)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(|f| f != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn text(&self, keys: &[&str]) -> Option<&str> {
        first(self.0, keys).and_then(Value::as_str)
    }

    /// Level number from a number, a numeric string (`"12"`, `"12.0"`), or a string
    /// ending in digits (`"level_12"`).
    fn level(&self) -> Option<u32> {
        if number(self.0, LEVEL_KEYS).is_some() {
            return self.count(LEVEL_KEYS);
        }
        let digits: String = first(self.0, LEVEL_KEYS)?
            .as_str()?
            .trim()
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        digits.parse().ok()
    }
}

/// First present, non-null value among `keys`.
fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Finite number from a JSON number or numeric string.
fn number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let raw = match first(obj, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    raw.is_finite().then_some(raw)
}
