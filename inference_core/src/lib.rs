//! # Inference Core
//!
//! A deterministic behavioral-inference engine. It reads an ordered log of puzzle
//! telemetry and scores the player against four archetypes (Blueprint, Action,
//! Nurturing, Knowledge), returning probabilities, a confidence value, and the
//! evidence that drove the result.
//!
//! ## Core Components
//!
//! - **context_tracker**: Which mechanics the current level offers, plus per-level counters
//! - **scoring**: The decaying, clamped score accumulator and the softmax
//! - **features**: The feature table, the streaming evaluator, and the aggregate pass
//! - **confidence**: Confidence from event volume, competence, and separation
//! - **evidence**: The explainability trail and its ranking
//! - **engine**: The pipeline entry points and the result types
//!
//! ## Design Philosophy
//!
//! - **Pure**: Every call is a function of its input alone; nothing persists between calls
//! - **Resilient**: Malformed events degrade the signal instead of failing the run
//! - **Explainable**: Every score change is recorded as evidence

pub mod config;
pub mod confidence;
pub mod context_tracker;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod features;
pub mod scoring;

pub use config::*;
pub use context_tracker::*;
pub use engine::*;
pub use error::*;
pub use evidence::*;
pub use features::*;
pub use scoring::*;
