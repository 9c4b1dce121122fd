//! Post-game AI commentary
//!
//! Asks a text-generation service to roast the player's score. Purely
//! cosmetic: it runs only after a crash, only when the player asks, at most
//! once per game over screen, and never feeds back into the simulation.
//! Every failure resolves to a fallback line instead of an error.

pub mod gemini;

use std::fmt;

pub use gemini::{GenerateRequest, GenerationConfig, parse_response};

/// Shown when no API key was configured
pub const MISSING_KEY_MESSAGE: &str =
    "Gemini API Key is missing. I can't judge your skills properly!";
/// Shown when the request or its response failed
pub const OFFLINE_MESSAGE: &str = "I'm currently offline, but assume I'm unimpressed.";
/// Shown when the service answered with no text
pub const SPEECHLESS_MESSAGE: &str = "Speechless...";

/// Why a commentary request produced no text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentaryError {
    MissingApiKey,
    /// Network or platform failure before a response arrived
    Transport(String),
    /// Non-success HTTP status
    Status(u16),
    /// Response body was not the expected JSON
    Malformed(String),
    /// Valid response without any text
    Empty,
}

impl fmt::Display for CommentaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "no API key configured"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Status(code) => write!(f, "service returned HTTP {code}"),
            Self::Malformed(msg) => write!(f, "malformed response: {msg}"),
            Self::Empty => write!(f, "response contained no text"),
        }
    }
}

impl std::error::Error for CommentaryError {}

impl CommentaryError {
    /// User-facing line for this failure
    pub fn fallback(&self) -> &'static str {
        match self {
            Self::MissingApiKey => MISSING_KEY_MESSAGE,
            Self::Empty => SPEECHLESS_MESSAGE,
            Self::Transport(_) | Self::Status(_) | Self::Malformed(_) => OFFLINE_MESSAGE,
        }
    }
}

/// How harshly to treat a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    /// 0-5
    Low,
    /// 6-20
    Medium,
    /// 21+
    High,
}

impl ScoreTier {
    pub fn for_score(score: u32) -> Self {
        match score {
            0..=5 => Self::Low,
            6..=20 => Self::Medium,
            _ => Self::High,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Low => "The score is low. Roast me hard for being terrible.",
            Self::Medium => "The score is medium. Give me a backhanded compliment.",
            Self::High => {
                "The score is high. Act surprised, but put it down to luck or say I have no life."
            }
        }
    }
}

/// Prompt sent to the text generator
pub fn build_prompt(score: u32) -> String {
    format!(
        "I just played Flappy Bird and scored {score}. \
         You are a sarcastic, witty, slightly mean but funny game coach. \
         {} Keep the response short (max 1 sentence).",
        ScoreTier::for_score(score).instruction()
    )
}

/// Something that turns a prompt into text, over whatever transport
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, CommentaryError>;
}

/// Request commentary, surfacing the failure reason
pub async fn fetch_commentary<G: TextGenerator>(
    generator: Option<&G>,
    score: u32,
) -> Result<String, CommentaryError> {
    let generator = generator.ok_or(CommentaryError::MissingApiKey)?;
    let request = GenerateRequest::new(build_prompt(score));
    let text = generator.generate(&request).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(CommentaryError::Empty);
    }
    Ok(text.to_string())
}

/// Request commentary, always producing something to show
pub async fn get_commentary<G: TextGenerator>(generator: Option<&G>, score: u32) -> String {
    match fetch_commentary(generator, score).await {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Commentary unavailable: {}", e);
            e.fallback().to_string()
        }
    }
}

/// Commentary lifecycle on one game over screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    /// Button not pressed yet
    #[default]
    Idle,
    /// Request in flight
    Loading,
    /// Text shown; no further requests until restart
    Ready(String),
}

/// Guards the once-per-game-over rule
#[derive(Debug, Clone, Default)]
pub struct CommentaryPanel {
    state: PanelState,
    /// Bumped on every request so replies can be matched to their screen
    generation: u64,
}

impl CommentaryPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the single request slot. Returns the token the reply must
    /// carry, or `None` if the slot is already used.
    pub fn begin(&mut self) -> Option<u64> {
        if self.state != PanelState::Idle {
            return None;
        }
        self.generation += 1;
        self.state = PanelState::Loading;
        Some(self.generation)
    }

    /// Store the text for the in-flight request. Replies for an older
    /// request are dropped; returns whether the text was accepted.
    pub fn finish(&mut self, token: u64, text: String) -> bool {
        if self.state != PanelState::Loading || token != self.generation {
            log::debug!("Dropping stale commentary reply (token {})", token);
            return false;
        }
        self.state = PanelState::Ready(text);
        true
    }

    /// New game over screen
    pub fn reset(&mut self) {
        self.state = PanelState::Idle;
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == PanelState::Loading
    }

    pub fn text(&self) -> Option<&str> {
        match &self.state {
            PanelState::Ready(text) => Some(text),
            _ => None,
        }
    }
}
