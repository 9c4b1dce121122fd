//! Data-driven game tuning
//!
//! Every constant the simulation reads comes from a [`Tuning`] value, so
//! balance tweaks never touch the algorithm. Loaded from LocalStorage on the
//! web and from a JSON file on native; anything missing falls back to
//! [`crate::consts`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Reasons a tuning set cannot drive the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// A dimension or rate that must be positive is not
    NonPositive { field: &'static str, value: f32 },
    /// Pipes would spawn every frame forever (or never)
    ZeroSpawnRate,
    /// Gap plus margins leave no room for a pipe
    GapTooLarge { gap: f32, field_height: f32 },
    /// Inset swallows the whole hitbox
    InsetTooLarge { inset: f32, bird_size: f32 },
    /// Rotation clamp is inverted
    RotationRange { min: f32, max: f32 },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::ZeroSpawnRate => write!(f, "pipe_spawn_rate must be at least 1"),
            Self::GapTooLarge { gap, field_height } => write!(
                f,
                "pipe gap {gap} leaves no room for pipes in a field of height {field_height}"
            ),
            Self::InsetTooLarge { inset, bird_size } => write!(
                f,
                "hitbox inset {inset} is too large for bird size {bird_size}"
            ),
            Self::RotationRange { min, max } => {
                write!(f, "rotation range [{min}, {max}] is inverted")
            }
        }
    }
}

impl std::error::Error for TuningError {}

/// Tunable game constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Bird ===
    pub bird_size: f32,
    /// Fixed horizontal position of the bird's left edge
    pub bird_x: f32,
    pub initial_bird_y: f32,
    pub hitbox_inset: f32,

    // === Pipes ===
    pub pipe_width: f32,
    pub pipe_gap: f32,
    pub min_pipe_height: f32,
    pub ground_margin: f32,
    pub pipe_speed: f32,
    /// Frames between spawns
    pub pipe_spawn_rate: u32,

    // === Physics ===
    pub gravity: f32,
    pub jump_strength: f32,

    // === Cosmetic ===
    pub rotation_gain: f32,
    pub rotation_min: f32,
    pub rotation_max: f32,
    pub idle_bob_amplitude: f32,
    pub idle_bob_rate: f32,
    pub restart_debounce_frames: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            bird_size: BIRD_SIZE,
            bird_x: BIRD_X,
            initial_bird_y: INITIAL_BIRD_Y,
            hitbox_inset: HITBOX_INSET,

            pipe_width: PIPE_WIDTH,
            pipe_gap: PIPE_GAP,
            min_pipe_height: MIN_PIPE_HEIGHT,
            ground_margin: GROUND_MARGIN,
            pipe_speed: PIPE_SPEED,
            pipe_spawn_rate: PIPE_SPAWN_RATE,

            gravity: GRAVITY,
            jump_strength: JUMP_STRENGTH,

            rotation_gain: ROTATION_GAIN,
            rotation_min: ROTATION_MIN,
            rotation_max: ROTATION_MAX,
            idle_bob_amplitude: IDLE_BOB_AMPLITUDE,
            idle_bob_rate: IDLE_BOB_RATE,
            restart_debounce_frames: RESTART_DEBOUNCE_FRAMES,
        }
    }
}

impl Tuning {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "flappyGenAiTuning";

    /// Tallest allowed top pipe
    pub fn max_pipe_height(&self) -> f32 {
        self.field_height - self.pipe_gap - self.min_pipe_height - self.ground_margin
    }

    /// Check the constraints the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("bird_size", self.bird_size),
            ("pipe_width", self.pipe_width),
            ("pipe_gap", self.pipe_gap),
            ("pipe_speed", self.pipe_speed),
            ("min_pipe_height", self.min_pipe_height),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        if self.pipe_spawn_rate == 0 {
            return Err(TuningError::ZeroSpawnRate);
        }
        if self.max_pipe_height() < self.min_pipe_height {
            return Err(TuningError::GapTooLarge {
                gap: self.pipe_gap,
                field_height: self.field_height,
            });
        }
        if self.hitbox_inset * 2.0 >= self.bird_size {
            return Err(TuningError::InsetTooLarge {
                inset: self.hitbox_inset,
                bird_size: self.bird_size,
            });
        }
        if self.rotation_min > self.rotation_max {
            return Err(TuningError::RotationRange {
                min: self.rotation_min,
                max: self.rotation_max,
            });
        }
        Ok(())
    }

    /// Parse tuning from JSON, rejecting sets that fail [`Tuning::validate`]
    pub fn from_json(json: &str) -> Option<Self> {
        let tuning: Self = match serde_json::from_str(json) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Ignoring unreadable tuning: {}", e);
                return None;
            }
        };
        match tuning.validate() {
            Ok(()) => Some(tuning),
            Err(e) => {
                log::warn!("Ignoring invalid tuning: {}", e);
                None
            }
        }
    }

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
            && let Some(tuning) = Self::from_json(&json)
        {
            log::info!("Loaded tuning from LocalStorage");
            return tuning;
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Load tuning from the JSON file named by `FLAPPY_TUNING`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("FLAPPY_TUNING") else {
            log::info!("Using default tuning");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|| {
                log::warn!("Falling back to default tuning");
                Self::default()
            }),
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                Self::default()
            }
        }
    }
}
