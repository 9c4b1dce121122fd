//! Flappy GenAI - A Flappy Bird clone judged by an AI coach
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, scoring)
//! - `tuning`: Data-driven game constants
//! - `highscores`: Best-score persistence
//! - `commentary`: Post-game AI commentary with graceful fallbacks
//! - `platform`: Browser input mapping
//! - `game_loop`: Per-frame driver that owns the simulation
//! - `autopilot`: Heuristic player for the headless runner

pub mod autopilot;
pub mod commentary;
pub mod game_loop;
pub mod highscores;
pub mod platform;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use game_loop::GameLoop;
pub use highscores::HighScoreStore;
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Bird bounding box (square) and fixed horizontal position
    pub const BIRD_SIZE: f32 = 30.0;
    pub const BIRD_X: f32 = 50.0;
    pub const INITIAL_BIRD_Y: f32 = FIELD_HEIGHT / 2.0;

    /// Pipe geometry
    pub const PIPE_WIDTH: f32 = 50.0;
    pub const PIPE_GAP: f32 = 165.0;
    pub const MIN_PIPE_HEIGHT: f32 = 50.0;
    /// Keeps the gap clear of the ground
    pub const GROUND_MARGIN: f32 = 50.0;

    /// Physics, all per frame
    pub const GRAVITY: f32 = 0.2;
    pub const JUMP_STRENGTH: f32 = 5.6;
    pub const PIPE_SPEED: f32 = 1.0;
    /// Frames between pipes (230 px spacing at PIPE_SPEED 1)
    pub const PIPE_SPAWN_RATE: u32 = 230;

    /// Shrinks the bird hitbox on every side so near misses feel fair
    pub const HITBOX_INSET: f32 = 4.0;

    /// Visual tilt in degrees
    pub const ROTATION_GAIN: f32 = 5.0;
    pub const ROTATION_MIN: f32 = -25.0;
    pub const ROTATION_MAX: f32 = 90.0;

    /// Idle screen bobbing
    pub const IDLE_BOB_AMPLITUDE: f32 = 10.0;
    /// Radians per frame (~ms / 300 at 60 Hz)
    pub const IDLE_BOB_RATE: f32 = 1.0 / 18.0;

    /// Frames between a restart and the bird reset (~50 ms at 60 Hz)
    pub const RESTART_DEBOUNCE_FRAMES: u32 = 3;
}
