//! Heuristic autopilot for the headless runner
//!
//! Aims the bird's bottom edge just above the bottom pipe of the next gap:
//! flap whenever the next frame would cross that line. An optional lapse
//! rate makes it blink (stop flapping for a while) so runs eventually end.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::game_loop::GameLoop;
use crate::highscores::HighScoreStore;
use crate::sim::{GamePhase, GameState};
use crate::tuning::Tuning;

/// Clearance kept above the bottom pipe
const BOTTOM_CLEARANCE: f32 = 8.0;
/// Frames a blink lasts
const BLINK_FRAMES: u32 = 20;

#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    /// Chance per frame of starting a blink
    lapse: f64,
    blink_frames: u32,
}

impl Autopilot {
    pub fn new(seed: u64, lapse: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            lapse: lapse.clamp(0.0, 1.0),
            blink_frames: 0,
        }
    }

    /// Never blinks
    pub fn perfect() -> Self {
        Self::new(0, 0.0)
    }

    /// Line the bird's bottom edge should stay above
    pub fn target_bottom(state: &GameState, tuning: &Tuning) -> f32 {
        state
            .obstacles
            .iter()
            .find(|o| o.right(tuning) >= tuning.bird_x)
            .map(|o| o.gap_bottom(tuning) - BOTTOM_CLEARANCE)
            .unwrap_or(tuning.field_height * 0.6)
    }

    /// Whether to flap this frame
    pub fn decide(&mut self, state: &GameState, tuning: &Tuning) -> bool {
        if self.blink_frames > 0 {
            self.blink_frames -= 1;
            return false;
        }
        if self.lapse > 0.0 && self.rng.random_bool(self.lapse) {
            self.blink_frames = BLINK_FRAMES - 1;
            return false;
        }

        let next_velocity = state.bird.velocity + tuning.gravity;
        let next_bottom = state.bird.y + next_velocity + tuning.bird_size;
        next_bottom > Self::target_bottom(state, tuning)
    }
}

/// Outcome of one autopilot episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeReport {
    pub episode: u32,
    pub score: u32,
    /// Frames from the starting flap to the crash or the cap
    pub frames: u32,
    /// False when the frame cap cut the run short
    pub crashed: bool,
    pub high_score: u32,
}

/// Play up to `episodes` runs of at most `max_frames` frames each. Every
/// episode starts from the title screen: crashed runs go through restart,
/// capped runs are abandoned. The last episode is left as it ended.
pub fn run_episodes<S: HighScoreStore>(
    game: &mut GameLoop<S>,
    pilot: &mut Autopilot,
    episodes: u32,
    max_frames: u32,
) -> Vec<EpisodeReport> {
    let mut reports = Vec::new();

    for episode in 1..=episodes {
        if !return_to_title(game) {
            break;
        }

        game.activate();
        let mut frames = 0;
        while frames < max_frames && game.phase() != GamePhase::Ended {
            if game.phase() == GamePhase::Running && pilot.decide(game.state(), game.tuning()) {
                game.activate();
            }
            if game.frame().is_none() {
                break;
            }
            frames += 1;
        }
        if game.is_cancelled() {
            break;
        }

        let report = EpisodeReport {
            episode,
            score: game.score(),
            frames,
            crashed: game.phase() == GamePhase::Ended,
            high_score: game.high_score(),
        };
        log::info!("{:?}", report);
        reports.push(report);
    }

    reports
}

/// Bring the loop back to an idle title screen. False once cancelled.
fn return_to_title<S: HighScoreStore>(game: &mut GameLoop<S>) -> bool {
    match game.phase() {
        GamePhase::Running => game.abandon(),
        GamePhase::Ended => {
            game.restart();
            if game.frame().is_none() {
                return false;
            }
        }
        GamePhase::Idle => {}
    }
    while game.is_resetting() {
        if game.frame().is_none() {
            return false;
        }
    }
    !game.is_cancelled()
}
