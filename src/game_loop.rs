//! Per-frame driver that owns the simulation
//!
//! Input handlers only queue actions here; the simulation is mutated solely
//! inside [`GameLoop::frame`], once per display frame. Renderers receive an
//! owned [`RenderSnapshot`] and never see the live state.

use crate::commentary::CommentaryPanel;
use crate::highscores::HighScoreStore;
use crate::platform::InputAction;
use crate::sim::{
    GameEvent, GamePhase, GameState, RenderSnapshot, TickInput, abandon_episode, tick,
};
use crate::tuning::Tuning;

/// Claim on the commentary slot of one game over screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentaryTicket {
    pub token: u64,
    pub score: u32,
}

pub struct GameLoop<S: HighScoreStore> {
    state: GameState,
    tuning: Tuning,
    store: S,
    /// Actions queued since the last frame
    input: TickInput,
    commentary: CommentaryPanel,
    /// Events produced by the most recent frame
    last_events: Vec<GameEvent>,
    frames: u64,
    cancelled: bool,
}

impl<S: HighScoreStore> GameLoop<S> {
    /// New session on the title screen, best score read from `store`
    pub fn new(seed: u64, tuning: Tuning, store: S) -> Self {
        let high_score = store.load();
        log::info!("Game initialized with seed {} (best {})", seed, high_score);
        Self {
            state: GameState::new(seed, high_score, &tuning),
            tuning,
            store,
            input: TickInput::default(),
            commentary: CommentaryPanel::new(),
            last_events: Vec::new(),
            frames: 0,
            cancelled: false,
        }
    }

    /// Queue an action for the next frame
    pub fn push(&mut self, action: InputAction) {
        match action {
            InputAction::Activate => self.input.activate = true,
            InputAction::Restart => self.input.restart = true,
        }
    }

    pub fn activate(&mut self) {
        self.push(InputAction::Activate);
    }

    pub fn restart(&mut self) {
        self.push(InputAction::Restart);
    }

    /// Run one frame and publish its snapshot. `None` once cancelled.
    pub fn frame(&mut self) -> Option<RenderSnapshot> {
        if self.cancelled {
            return None;
        }

        let input = self.input;
        tick(&mut self.state, &input, &self.tuning);
        // Clear one-shot inputs after processing
        self.input = TickInput::default();
        self.frames += 1;

        self.dispatch_events();

        Some(self.snapshot())
    }

    /// Drop a run in progress and go back to the title screen without a
    /// game over. No-op outside Running.
    pub fn abandon(&mut self) {
        abandon_episode(&mut self.state, &self.tuning);
        self.input = TickInput::default();
        self.dispatch_events();
    }

    fn dispatch_events(&mut self) {
        self.last_events = self.state.drain_events();
        for event in &self.last_events {
            match *event {
                GameEvent::NewHighScore { score } => self.store.save(score),
                GameEvent::Crashed { .. } | GameEvent::Reset => self.commentary.reset(),
                _ => {}
            }
        }
    }

    /// A restart is pending and input is being swallowed
    pub fn is_resetting(&self) -> bool {
        self.state.reset_countdown.is_some()
    }

    /// Stop the loop; later frames do nothing
    pub fn cancel(&mut self) {
        if !self.cancelled {
            log::info!("Game loop cancelled after {} frames", self.frames);
        }
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::from(&self.state)
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn high_score(&self) -> u32 {
        self.state.high_score
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_events(&self) -> &[GameEvent] {
        &self.last_events
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn commentary(&self) -> &CommentaryPanel {
        &self.commentary
    }

    /// Commentary may only be requested from the game over screen
    pub fn begin_commentary(&mut self) -> Option<CommentaryTicket> {
        if self.state.phase != GamePhase::Ended {
            return None;
        }
        let token = self.commentary.begin()?;
        Some(CommentaryTicket {
            token,
            score: self.state.score,
        })
    }

    /// Deliver a reply. Returns false if its screen is already gone.
    pub fn finish_commentary(&mut self, ticket: CommentaryTicket, text: String) -> bool {
        self.commentary.finish(ticket.token, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::PanelState;
    use crate::highscores::MemoryStore;

    fn sparse_tuning() -> Tuning {
        Tuning {
            pipe_spawn_rate: 100_000,
            ..Default::default()
        }
    }

    /// Let the bird fall until it hits the ground
    fn crash(game: &mut GameLoop<MemoryStore>) {
        let mut guard = 0;
        while game.phase() == GamePhase::Running {
            game.frame();
            guard += 1;
            assert!(guard < 1000);
        }
        assert_eq!(game.phase(), GamePhase::Ended);
    }

    #[test]
    fn test_loads_high_score_from_store() {
        let game = GameLoop::new(1, Tuning::default(), MemoryStore::new(Some(10)));
        assert_eq!(game.high_score(), 10);
        assert_eq!(game.snapshot().high_score, 10);
    }

    #[test]
    fn test_input_waits_for_frame() {
        let mut game = GameLoop::new(1, sparse_tuning(), MemoryStore::default());
        game.activate();
        assert_eq!(game.phase(), GamePhase::Idle);

        let snapshot = game.frame().expect("frame");
        assert_eq!(snapshot.phase, GamePhase::Running);
        assert_eq!(game.last_events()[0], GameEvent::Started);

        // Input is one-shot
        let before = game.state().bird;
        game.frame();
        assert_eq!(game.state().bird.velocity, before.velocity + game.tuning().gravity);
    }

    #[test]
    fn test_new_best_is_persisted_once() {
        let mut game = GameLoop::new(1, sparse_tuning(), MemoryStore::new(Some(2)));
        game.activate();
        game.frame();
        game.state.score = 5;
        crash(&mut game);

        assert_eq!(game.high_score(), 5);
        assert_eq!(game.store().value, Some(5));
        assert_eq!(game.store().saves, 1);
    }

    #[test]
    fn test_lower_score_not_persisted() {
        let mut game = GameLoop::new(1, sparse_tuning(), MemoryStore::new(Some(10)));
        game.activate();
        game.frame();
        game.state.score = 7;
        crash(&mut game);

        assert_eq!(game.high_score(), 10);
        assert_eq!(game.store().saves, 0);
    }

    #[test]
    fn test_cancel_halts_mutation() {
        let mut game = GameLoop::new(1, sparse_tuning(), MemoryStore::default());
        game.activate();
        game.frame();
        let frozen = game.snapshot();

        game.cancel();
        game.activate();
        for _ in 0..10 {
            assert!(game.frame().is_none());
        }
        assert!(game.is_cancelled());
        assert_eq!(game.snapshot(), frozen);
        assert_eq!(game.frames(), 1);
    }

    #[test]
    fn test_full_restart_cycle() {
        let mut game = GameLoop::new(3, Tuning::default(), MemoryStore::default());
        game.activate();
        game.frame();
        game.state.score = 3;
        crash(&mut game);

        // Jump input on the game over screen does nothing
        game.activate();
        assert_eq!(game.frame().map(|s| s.phase), Some(GamePhase::Ended));

        game.restart();
        game.frame();
        assert_eq!(game.phase(), GamePhase::Idle);
        for _ in 0..game.tuning().restart_debounce_frames {
            game.frame();
        }

        game.activate();
        let snapshot = game.frame().expect("frame");
        assert_eq!(snapshot.phase, GamePhase::Running);
        assert_eq!(snapshot.score, 0);
        assert!(snapshot.obstacles.is_empty());
        assert_eq!(snapshot.high_score, 3);
    }

    #[test]
    fn test_commentary_once_per_game_over() {
        let mut game = GameLoop::new(1, sparse_tuning(), MemoryStore::default());
        assert_eq!(game.begin_commentary(), None);

        game.activate();
        game.frame();
        game.state.score = 4;
        crash(&mut game);

        let ticket = game.begin_commentary().expect("ticket");
        assert_eq!(ticket.score, 4);
        assert_eq!(game.begin_commentary(), None);
        assert!(game.finish_commentary(ticket, "Four. Impressive, for a rock.".to_string()));
        assert_eq!(game.begin_commentary(), None);

        // Simulation untouched by commentary
        assert_eq!(game.score(), 4);
        assert_eq!(game.phase(), GamePhase::Ended);

        game.restart();
        game.frame();
        assert_eq!(game.commentary().state(), &PanelState::Idle);
    }

    #[test]
    fn test_late_reply_skips_next_game_over() {
        let mut game = GameLoop::new(1, sparse_tuning(), MemoryStore::default());
        game.activate();
        game.frame();
        game.state.score = 2;
        crash(&mut game);
        let first = game.begin_commentary().expect("ticket");

        // Restart and crash again before the first reply arrives
        game.restart();
        for _ in 0..=game.tuning().restart_debounce_frames {
            game.frame();
        }
        game.activate();
        game.frame();
        game.state.score = 9;
        crash(&mut game);
        let second = game.begin_commentary().expect("ticket");
        assert_eq!(second.score, 9);

        assert!(!game.finish_commentary(first, "Two? Really?".to_string()));
        assert!(game.commentary().is_loading());
        assert!(game.finish_commentary(second, "Nine. Almost competent.".to_string()));
        assert_eq!(game.commentary().text(), Some("Nine. Almost competent."));
    }

    #[test]
    fn test_abandon_returns_to_title_without_game_over() {
        let mut game = GameLoop::new(1, sparse_tuning(), MemoryStore::new(Some(3)));
        game.activate();
        game.frame();
        game.state.score = 8;
        game.activate();

        game.abandon();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.score(), 0);
        assert!(!game.is_resetting());
        assert_eq!(game.last_events(), &[GameEvent::Reset]);
        assert_eq!(game.high_score(), 3);
        assert_eq!(game.store().saves, 0);
        assert_eq!(game.begin_commentary(), None);

        // Queued jump was dropped with the run
        game.frame();
        assert_eq!(game.phase(), GamePhase::Idle);

        game.activate();
        let snapshot = game.frame().expect("frame");
        assert_eq!(snapshot.phase, GamePhase::Running);
        assert_eq!(snapshot.score, 0);
        assert_eq!(game.state().episode_frames, 1);
    }
}
