//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per display frame, all rates expressed per frame
//! - Seeded RNG only
//! - Pipes kept in creation order
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{Hitbox, check_bounds, check_collision, check_obstacles, collides};
pub use snapshot::{BirdView, ObstacleView, RenderSnapshot};
pub use state::{Bird, CrashCause, GameEvent, GamePhase, GameState, Obstacle, ObstacleStream};
pub use tick::{
    TickInput, abandon_episode, request_restart, spawn_obstacle, start_episode, tick,
};
