//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically, one display
//! frame per call.

use rand::Rng;

use super::collision::check_collision;
use super::state::{Bird, CrashCause, GameEvent, GamePhase, GameState, Obstacle};
use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Start (Idle) or jump (Running): space, up arrow, click, tap
    pub activate: bool,
    /// Restart button on the game over screen
    pub restart: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning) {
    match state.phase {
        GamePhase::Idle => {
            if let Some(remaining) = state.reset_countdown {
                // Bird stays frozen and input is swallowed until the reset lands
                if remaining <= 1 {
                    finish_reset(state, tuning);
                } else {
                    state.reset_countdown = Some(remaining - 1);
                }
                return;
            }

            if input.activate {
                start_episode(state, tuning);
                step_running(state, tuning);
            } else {
                state.idle_frames = state.idle_frames.wrapping_add(1);
                state.bird.bob(state.idle_frames, tuning);
            }
        }

        GamePhase::Running => {
            if input.activate {
                state.bird.flap(tuning);
                state.events.push(GameEvent::Flapped);
            }
            step_running(state, tuning);
        }

        GamePhase::Ended => {
            if input.restart {
                request_restart(state, tuning);
            }
        }
    }
}

/// Idle -> Running: fresh episode plus the opening flap
pub fn start_episode(state: &mut GameState, tuning: &Tuning) {
    state.phase = GamePhase::Running;
    state.score = 0;
    state.bird = Bird::new(tuning);
    state.obstacles.clear();
    state.episode_frames = 0;
    state.reset_countdown = None;
    state.bird.flap(tuning);
    state.events.push(GameEvent::Started);
    log::info!("Episode started (seed {})", state.seed);
}

/// Ended -> Idle, with the bird reset deferred by the debounce window
pub fn request_restart(state: &mut GameState, tuning: &Tuning) {
    state.phase = GamePhase::Idle;
    state.events.push(GameEvent::Reset);
    if tuning.restart_debounce_frames == 0 {
        finish_reset(state, tuning);
    } else {
        state.reset_countdown = Some(tuning.restart_debounce_frames);
    }
    log::info!("Back to title screen");
}

/// Running -> Idle without a game over screen. The run is dropped: no
/// crash, no high score, no debounce.
pub fn abandon_episode(state: &mut GameState, tuning: &Tuning) {
    if state.phase != GamePhase::Running {
        return;
    }
    log::info!("Episode abandoned with score {}", state.score);
    state.phase = GamePhase::Idle;
    state.score = 0;
    state.obstacles.clear();
    state.episode_frames = 0;
    state.events.push(GameEvent::Reset);
    finish_reset(state, tuning);
}

fn finish_reset(state: &mut GameState, tuning: &Tuning) {
    state.reset_countdown = None;
    state.bird = Bird::new(tuning);
    state.idle_frames = 0;
}

/// One Running frame: physics, spawn, scroll, score, collide
fn step_running(state: &mut GameState, tuning: &Tuning) {
    state.episode_frames = state.episode_frames.wrapping_add(1);

    state.bird.integrate(tuning);

    if state.episode_frames % tuning.pipe_spawn_rate == 0 {
        spawn_obstacle(state, tuning);
    }

    state.obstacles.advance(tuning.pipe_speed);
    if let Some(evicted) = state.obstacles.evict_front(tuning) {
        log::debug!("Pipe {} left the field", evicted.id);
    }

    update_score(state, tuning);

    if let Some(cause) = check_collision(state.bird.y, &state.obstacles, tuning) {
        end_episode(state, cause);
    }
}

/// Append a new pipe pair at the right edge with a random gap height
pub fn spawn_obstacle(state: &mut GameState, tuning: &Tuning) {
    let top_height = random_top_height(state, tuning);
    let id = state.next_obstacle_id();
    state.obstacles.push(Obstacle {
        id,
        x: tuning.field_width,
        top_height,
        passed: false,
    });
    log::debug!("Spawned pipe {} (top {})", id, top_height);
}

/// Whole-unit height in `[min_pipe_height, max_pipe_height]`
fn random_top_height(state: &mut GameState, tuning: &Tuning) -> f32 {
    let low = tuning.min_pipe_height.ceil() as u32;
    let high = tuning.max_pipe_height().floor().max(0.0) as u32;
    if high < low {
        return tuning.min_pipe_height;
    }
    state.rng.random_range(low..=high) as f32
}

/// Count every pipe whose right edge has cleared the bird
fn update_score(state: &mut GameState, tuning: &Tuning) {
    for obstacle in state.obstacles.iter_mut() {
        if !obstacle.passed && obstacle.right(tuning) < tuning.bird_x {
            obstacle.passed = true;
            state.score += 1;
            state.events.push(GameEvent::Scored { score: state.score });
        }
    }
}

/// Running -> Ended, recording a new best if earned
fn end_episode(state: &mut GameState, cause: CrashCause) {
    state.phase = GamePhase::Ended;
    state.events.push(GameEvent::Crashed {
        score: state.score,
        cause,
    });
    log::info!("Crashed into {:?} with score {}", cause, state.score);

    if state.score > state.high_score {
        state.high_score = state.score;
        state.events.push(GameEvent::NewHighScore { score: state.score });
        log::info!("New high score: {}", state.score);
    }
}
