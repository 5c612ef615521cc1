//! Event log - normalization, the at-rest JSON format, and per-level run splitting.
//!
//! The at-rest format is a flat, unordered JSON array of event objects with a numeric
//! `ts` (or `t`) field. Loading a log always normalizes it: events are sorted by
//! timestamp, and events with equal timestamps keep their original relative order.

use serde_json::Value;
use thiserror::Error;

use crate::events::TelemetryEvent;
use crate::mechanics::EventKind;

/// Errors raised while loading a telemetry log.
#[derive(Debug, Error)]
pub enum LogError {
    /// The text was not valid JSON.
    #[error("malformed telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level value was valid JSON but not an array.
    #[error("telemetry log must be a JSON array, found {found}")]
    NotAnArray { found: &'static str },
}

/// Stable timestamp sort.
///
/// Missing or non-finite timestamps sort as `0.0`. Ties keep input order.
pub fn normalize(events: impl IntoIterator<Item = TelemetryEvent>) -> Vec<TelemetryEvent> {
    let mut events: Vec<_> = events.into_iter().collect();
    events.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));
    events
}

/// A normalized sequence of telemetry events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<TelemetryEvent>,

    /// Entries dropped while parsing (unknown kinds, non-objects).
    skipped: usize,
}

impl EventLog {
    /// Build a log from typed events, normalizing their order.
    pub fn new(events: impl IntoIterator<Item = TelemetryEvent>) -> Self {
        Self {
            events: normalize(events),
            skipped: 0,
        }
    }

    /// Build a log from a JSON value, which must be an array.
    ///
    /// Elements that are not recognizable events are skipped and counted.
    pub fn from_value(value: &Value) -> Result<Self, LogError> {
        let items = value.as_array().ok_or(LogError::NotAnArray {
            found: json_type_name(value),
        })?;

        let mut events = Vec::with_capacity(items.len());
        let mut skipped = 0;
        for item in items {
            match TelemetryEvent::from_value(item) {
                Some(event) => events.push(event),
                None => {
                    skipped += 1;
                    tracing::trace!(?item, "skipping unrecognized telemetry entry");
                }
            }
        }

        Ok(Self {
            events: normalize(events),
            skipped,
        })
    }

    /// Parse the at-rest format from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, LogError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Events in normalized order.
    pub fn events(&self) -> &[TelemetryEvent] {
        &self.events
    }

    /// Number of entries dropped while parsing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Split into per-level runs, one per `level_start`.
    ///
    /// Each run begins at a `level_start` and extends up to the next one. Events that
    /// precede the first `level_start` form a leading run of their own.
    pub fn split_runs(&self) -> Vec<EventLog> {
        let mut runs: Vec<Vec<TelemetryEvent>> = Vec::new();

        for event in &self.events {
            let starts_run = event.kind() == EventKind::LevelStart;
            match runs.last_mut() {
                Some(run) if !starts_run => run.push(event.clone()),
                _ => runs.push(vec![event.clone()]),
            }
        }

        runs.into_iter()
            .map(|events| EventLog { events, skipped: 0 })
            .collect()
    }
}

impl IntoIterator for EventLog {
    type Item = TelemetryEvent;
    type IntoIter = std::vec::IntoIter<TelemetryEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// Human-readable JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
