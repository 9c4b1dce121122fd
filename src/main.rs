//! Flappy GenAI entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use flappy_genai::commentary::gemini::FetchGenerator;
    use flappy_genai::commentary::get_commentary;
    use flappy_genai::highscores::LocalStorageStore;
    use flappy_genai::platform::{InputAction, map_key, map_pointer};
    use flappy_genai::renderer::CanvasRenderer;
    use flappy_genai::sim::{GamePhase, RenderSnapshot};
    use flappy_genai::{GameLoop, Tuning};

    /// Game instance holding all state
    struct Game {
        game_loop: GameLoop<LocalStorageStore>,
        renderer: Option<CanvasRenderer>,
        /// Pending requestAnimationFrame handle
        raf_handle: Option<i32>,
        /// Track phase for overlay toggling
        last_phase: Option<GamePhase>,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning) -> Self {
            Self {
                game_loop: GameLoop::new(seed, tuning, LocalStorageStore),
                renderer: None,
                raf_handle: None,
                last_phase: None,
            }
        }

        /// Render the current frame
        fn render(&self, snapshot: &RenderSnapshot) {
            if let Some(ref renderer) = self.renderer {
                renderer.draw(snapshot, self.game_loop.tuning());
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, snapshot: &RenderSnapshot) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if self.last_phase == Some(snapshot.phase) {
                return;
            }
            self.last_phase = Some(snapshot.phase);

            set_visible(&document, "start-screen", snapshot.phase == GamePhase::Idle);
            set_visible(&document, "game-over", snapshot.phase == GamePhase::Ended);

            if snapshot.phase == GamePhase::Ended {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&snapshot.score.to_string()));
                }
                if let Some(el) = document.get_element_by_id("best-score") {
                    el.set_text_content(Some(&snapshot.high_score.to_string()));
                }
                // Fresh game over screen: commentary button available again
                if let Some(el) = document.get_element_by_id("commentary-text") {
                    el.set_text_content(None);
                }
                set_visible(&document, "commentary-btn", true);
            }
        }

        /// Stop the loop and drop the pending frame callback
        fn teardown(&mut self) {
            self.game_loop.cancel();
            if let (Some(handle), Some(window)) = (self.raf_handle.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(handle);
            }
        }
    }

    fn set_visible(document: &web_sys::Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Flappy GenAI starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let tuning = Tuning::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, tuning)));

        {
            let mut g = game.borrow_mut();
            match CanvasRenderer::new(&canvas, g.game_loop.tuning()) {
                Ok(renderer) => g.renderer = Some(renderer),
                Err(e) => log::error!("Canvas unavailable: {:?}", e),
            }
        }

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_commentary_button(game.clone());
        setup_teardown(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Flappy GenAI running!");
    }

    fn queue(game: &Rc<RefCell<Game>>, action: InputAction) {
        game.borrow_mut().game_loop.push(action);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(outcome) = map_key(&event.code()) {
                    if outcome.prevent_default {
                        event.prevent_default(); // Prevent scrolling
                    }
                    queue(&game, outcome.action);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(action) = map_pointer(&event.type_()) {
                    queue(&game, action);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(action) = map_pointer(&event.type_()) {
                    queue(&game, action);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                queue(&game, InputAction::Restart);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_commentary_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("commentary-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                let Some(ticket) = game.borrow_mut().game_loop.begin_commentary() else {
                    return;
                };

                let document = web_sys::window().and_then(|w| w.document());
                if let Some(document) = &document {
                    set_visible(document, "commentary-btn", false);
                    if let Some(el) = document.get_element_by_id("commentary-text") {
                        el.set_text_content(Some("Gemini is thinking..."));
                    }
                }

                let game = game.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let generator = FetchGenerator::from_build_env();
                    let text = get_commentary(generator.as_ref(), ticket.score).await;

                    let mut g = game.borrow_mut();
                    // Dropped if the player already left this game over screen
                    if !g.game_loop.finish_commentary(ticket, text) {
                        return;
                    }
                    if let (Some(text), Some(document)) = (g.game_loop.commentary().text(), document)
                        && let Some(el) = document.get_element_by_id("commentary-text")
                    {
                        el.set_text_content(Some(&format!("\"{}\"", text)));
                    }
                });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Halt the loop when the page goes away
    fn setup_teardown(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().teardown();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let next = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(next, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => game.borrow_mut().raf_handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, _time: f64) {
        {
            let mut g = game.borrow_mut();
            g.raf_handle = None;

            let Some(snapshot) = g.game_loop.frame() else {
                return;
            };
            g.render(&snapshot);
            g.update_hud(&snapshot);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless runner: the autopilot plays seeded episodes
#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use flappy_genai::autopilot::{Autopilot, run_episodes};
    use flappy_genai::commentary::gemini::UreqGenerator;
    use flappy_genai::commentary::get_commentary;
    use flappy_genai::highscores::FileStore;
    use flappy_genai::{GameLoop, Tuning};

    const DEFAULT_HIGHSCORE_PATH: &str = "flappy-genai-highscore.json";

    fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        match std::env::var(name) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring unparsable {}={}", name, raw);
                default
            }),
            Err(_) => default,
        }
    }

    pub fn run() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let seed = env_or("FLAPPY_SEED", now);
        let episodes: u32 = env_or("FLAPPY_EPISODES", 1);
        let max_frames: u32 = env_or("FLAPPY_MAX_FRAMES", 60 * 60 * 5);
        let lapse: f64 = env_or("FLAPPY_LAPSE", 0.002);
        let path: String = env_or("FLAPPY_HIGHSCORE_PATH", DEFAULT_HIGHSCORE_PATH.to_string());

        let tuning = Tuning::load();
        let mut game = GameLoop::new(seed, tuning, FileStore::new(path));
        let mut pilot = Autopilot::new(seed, lapse);

        for report in run_episodes(&mut game, &mut pilot, episodes, max_frames) {
            if report.crashed {
                println!(
                    "Episode {}: crashed with score {} after {} frames (best {})",
                    report.episode, report.score, report.frames, report.high_score
                );
            } else {
                println!(
                    "Episode {}: still flying after {} frames with score {}",
                    report.episode, report.frames, report.score
                );
            }
        }

        // Only the final run can still be on its game over screen
        if let Some(ticket) = game.begin_commentary() {
            let generator = UreqGenerator::from_env();
            let text = pollster::block_on(get_commentary(generator.as_ref(), ticket.score));
            if game.finish_commentary(ticket, text)
                && let Some(text) = game.commentary().text()
            {
                println!("Coach: \"{}\"", text);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flappy GenAI (native) starting...");
    log::info!("Browser build runs with `trunk serve`; running headless autopilot");

    native::run();
}
