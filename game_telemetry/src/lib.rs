//! # Game Telemetry
//!
//! The telemetry vocabulary shared between the puzzle game and the archetype engine.
//! This crate describes what the game reports (event kinds, typed events, level bands)
//! and what the engine scores against (archetypes), but contains no inference logic.

pub mod archetypes;
pub mod events;
pub mod log;
pub mod mechanics;

pub use archetypes::*;
pub use events::*;
pub use log::*;
pub use mechanics::*;
