//! Game state and core simulation types
//!
//! Everything the frame loop mutates lives here, owned by [`GameState`].

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, bird bobbing in place
    Idle,
    /// Active gameplay
    Running,
    /// Crashed; waits for an explicit restart
    Ended,
}

/// The player's bird. Horizontal position is fixed by [`Tuning::bird_x`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    /// Top edge, measured down from the top of the field
    pub y: f32,
    /// Field units per frame, positive is downward
    pub velocity: f32,
    /// Visual tilt in degrees
    pub rotation: f32,
}

impl Bird {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            y: tuning.initial_bird_y,
            velocity: 0.0,
            rotation: 0.0,
        }
    }

    /// Instantaneous upward impulse. Replaces the current velocity.
    pub fn flap(&mut self, tuning: &Tuning) {
        self.velocity = -tuning.jump_strength;
    }

    /// One frame of gravity, then position, then the derived tilt
    pub fn integrate(&mut self, tuning: &Tuning) {
        self.velocity += tuning.gravity;
        self.y += self.velocity;
        self.rotation = rotation_for(self.velocity, tuning);
    }

    /// Title screen motion around the starting height
    pub fn bob(&mut self, idle_frame: u32, tuning: &Tuning) {
        let phase = idle_frame as f32 * tuning.idle_bob_rate;
        self.y = tuning.initial_bird_y + phase.sin() * tuning.idle_bob_amplitude;
        self.rotation = 0.0;
    }
}

/// Tilt for a given vertical velocity
#[inline]
pub fn rotation_for(velocity: f32, tuning: &Tuning) -> f32 {
    (velocity * tuning.rotation_gain).clamp(tuning.rotation_min, tuning.rotation_max)
}

/// A top/bottom pipe pair sharing one x and a fixed gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Bottom edge of the top pipe; the bottom pipe starts at `top_height + gap`
    pub top_height: f32,
    /// Already counted toward the score
    pub passed: bool,
}

impl Obstacle {
    /// Right edge
    #[inline]
    pub fn right(&self, tuning: &Tuning) -> f32 {
        self.x + tuning.pipe_width
    }

    /// Top edge of the bottom pipe
    #[inline]
    pub fn gap_bottom(&self, tuning: &Tuning) -> f32 {
        self.top_height + tuning.pipe_gap
    }

    /// Entirely past the left edge of the field
    #[inline]
    pub fn is_offscreen(&self, tuning: &Tuning) -> bool {
        self.x < -tuning.pipe_width
    }
}

/// Pipes in creation order: the front is always the oldest and leftmost.
///
/// Pipes spawn at the same x and all move at the same speed, so creation
/// order and position order never diverge. Eviction only has to look at the
/// front because of that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleStream {
    obstacles: VecDeque<Obstacle>,
}

impl ObstacleStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly spawned pipe at the back
    pub fn push(&mut self, obstacle: Obstacle) {
        debug_assert!(
            self.obstacles
                .back()
                .is_none_or(|last| last.id < obstacle.id && last.x <= obstacle.x),
            "obstacle {} would break stream ordering",
            obstacle.id
        );
        self.obstacles.push_back(obstacle);
    }

    /// Move every pipe left by `speed`
    pub fn advance(&mut self, speed: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.x -= speed;
        }
    }

    /// Drop the oldest pipe if it has scrolled fully off-screen
    pub fn evict_front(&mut self, tuning: &Tuning) -> Option<Obstacle> {
        if self.obstacles.front()?.is_offscreen(tuning) {
            self.obstacles.pop_front()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn front(&self) -> Option<&Obstacle> {
        self.obstacles.front()
    }

    pub fn back(&self) -> Option<&Obstacle> {
        self.obstacles.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Obstacle> {
        self.obstacles.iter_mut()
    }

    /// Ids strictly increase and x never increases from back to front
    pub fn is_ordered(&self) -> bool {
        self.obstacles
            .iter()
            .zip(self.obstacles.iter().skip(1))
            .all(|(older, newer)| older.id < newer.id && older.x <= newer.x)
    }
}

/// What ended the episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashCause {
    Ground,
    Ceiling,
    Obstacle { id: u32 },
}

/// Things that happened during a tick, drained by the loop driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Idle -> Running
    Started,
    /// Jump while Running
    Flapped,
    /// A pipe was passed
    Scored { score: u32 },
    /// Running -> Ended
    Crashed { score: u32, cause: CrashCause },
    /// Score beat the stored best; persist it
    NewHighScore { score: u32 },
    /// Ended -> Idle
    Reset,
}

/// Complete simulation state (deterministic for a given seed and input)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// Pipe height RNG
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub bird: Bird,
    pub obstacles: ObstacleStream,
    pub score: u32,
    /// Best score seen, seeded from storage at startup
    pub high_score: u32,
    /// Running frames since the episode started (drives spawning)
    pub episode_frames: u32,
    /// Frames spent on the title screen (drives bobbing)
    pub idle_frames: u32,
    /// Frames left before the bird is reset after a restart
    pub reset_countdown: Option<u32>,
    /// Events from the most recent ticks, oldest first
    pub events: Vec<GameEvent>,
    /// Next obstacle id, monotonic over the whole session
    next_id: u32,
}

impl GameState {
    /// Create a new session on the title screen
    pub fn new(seed: u64, high_score: u32, tuning: &Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            bird: Bird::new(tuning),
            obstacles: ObstacleStream::new(),
            score: 0,
            high_score,
            episode_frames: 0,
            idle_frames: 0,
            reset_countdown: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new obstacle ID
    pub fn next_obstacle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe(id: u32, x: f32) -> Obstacle {
        Obstacle {
            id,
            x,
            top_height: 100.0,
            passed: false,
        }
    }

    #[test]
    fn test_flap_overrides_velocity() {
        let tuning = Tuning::default();
        let mut bird = Bird::new(&tuning);
        bird.velocity = 12.0;
        bird.flap(&tuning);
        assert_eq!(bird.velocity, -tuning.jump_strength);
        bird.flap(&tuning);
        assert_eq!(bird.velocity, -tuning.jump_strength);
    }

    #[test]
    fn test_integrate_order() {
        let tuning = Tuning::default();
        let mut bird = Bird::new(&tuning);
        bird.velocity = 1.0;
        let y0 = bird.y;
        bird.integrate(&tuning);
        assert_eq!(bird.velocity, 1.0 + tuning.gravity);
        assert_eq!(bird.y, y0 + (1.0 + tuning.gravity));
        assert_eq!(bird.rotation, (1.0 + tuning.gravity) * tuning.rotation_gain);
    }

    #[test]
    fn test_rotation_clamps() {
        let tuning = Tuning::default();
        assert_eq!(rotation_for(100.0, &tuning), tuning.rotation_max);
        assert_eq!(rotation_for(-100.0, &tuning), tuning.rotation_min);
        assert_eq!(rotation_for(0.0, &tuning), 0.0);
    }

    #[test]
    fn test_bob_is_bounded() {
        let tuning = Tuning::default();
        let mut bird = Bird::new(&tuning);
        bird.rotation = 30.0;
        for frame in 0..500 {
            bird.bob(frame, &tuning);
            assert!((bird.y - tuning.initial_bird_y).abs() <= tuning.idle_bob_amplitude);
            assert_eq!(bird.rotation, 0.0);
        }
    }

    #[test]
    fn test_evict_front_only_when_offscreen() {
        let tuning = Tuning::default();
        let mut stream = ObstacleStream::new();
        stream.push(pipe(1, -tuning.pipe_width));
        stream.push(pipe(2, 100.0));

        // Exactly at -width is still on the boundary
        assert!(stream.evict_front(&tuning).is_none());

        stream.advance(0.5);
        let evicted = stream.evict_front(&tuning).expect("front should be evicted");
        assert_eq!(evicted.id, 1);
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.front().map(|o| o.id), Some(2));
    }

    #[test]
    fn test_ordering_check() {
        let mut stream = ObstacleStream::new();
        assert!(stream.is_ordered());
        stream.push(pipe(1, 10.0));
        stream.push(pipe(2, 240.0));
        stream.push(pipe(3, 400.0));
        assert!(stream.is_ordered());

        stream.iter_mut().for_each(|o| {
            if o.id == 3 {
                o.x = 0.0;
            }
        });
        assert!(!stream.is_ordered());
    }

    #[test]
    fn test_ids_are_monotonic() {
        let tuning = Tuning::default();
        let mut state = GameState::new(7, 0, &tuning);
        let a = state.next_obstacle_id();
        let b = state.next_obstacle_id();
        assert!(b > a);
    }
}
