//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, mouse, touch) mapped to logical actions
//! - Storage lives in [`crate::highscores`] and [`crate::tuning`]

pub mod input;

pub use input::{InputAction, KeyOutcome, map_key, map_pointer};
