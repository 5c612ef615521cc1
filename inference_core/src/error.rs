//! Error types for the inference engine.

use game_telemetry::LogError;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures surfaced by the engine's fallible entry points.
///
/// Individual malformed events never produce an error; they are skipped or read as
/// absent. Only the shape of the input as a whole can fail.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The input was not valid JSON or was not a JSON array of events.
    #[error("invalid telemetry input: {0}")]
    Input(#[from] LogError),

    /// The engine configuration could not be loaded.
    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
}
