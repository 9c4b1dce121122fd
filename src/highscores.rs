//! High score persistence
//!
//! The simulation never touches storage. The loop driver loads the best
//! score once at startup and saves it whenever the sim reports a new one.
//! Storage failures degrade to "no high score yet" and skipped saves.

use serde::{Deserialize, Serialize};

/// Durable single-value store for the best score
pub trait HighScoreStore {
    /// Stored best score, 0 if absent or unreadable
    fn load(&self) -> u32;
    /// Persist a new best score; failures are logged and swallowed
    fn save(&mut self, score: u32);
}

/// Parse a stored score string
pub fn parse_score(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// In-memory store (tests, and platforms without storage)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub value: Option<u32>,
    pub saves: usize,
}

impl MemoryStore {
    pub fn new(value: Option<u32>) -> Self {
        Self { value, saves: 0 }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.value.unwrap_or(0)
    }

    fn save(&mut self, score: u32) {
        self.value = Some(score);
        self.saves += 1;
    }
}

/// Browser LocalStorage, stored as a decimal string
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    const STORAGE_KEY: &'static str = "flappyGenAiHighScore";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl HighScoreStore for LocalStorageStore {
    fn load(&self) -> u32 {
        let stored = Self::storage().and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());
        match stored.as_deref().and_then(parse_score) {
            Some(score) => {
                log::info!("Loaded high score {}", score);
                score
            }
            None => {
                log::info!("No high score found, starting fresh");
                0
            }
        }
    }

    fn save(&mut self, score: u32) {
        match Self::storage() {
            Some(storage) => {
                if storage
                    .set_item(Self::STORAGE_KEY, &score.to_string())
                    .is_err()
                {
                    log::warn!("Could not save high score");
                } else {
                    log::info!("High score saved ({})", score);
                }
            }
            None => log::warn!("LocalStorage unavailable, high score not saved"),
        }
    }
}

/// On-disk record used by [`FileStore`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: u32,
}

/// JSON file store for the native runner
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HighScoreStore for FileStore {
    fn load(&self) -> u32 {
        let Ok(json) = std::fs::read_to_string(&self.path) else {
            log::info!("No high score file at {}", self.path.display());
            return 0;
        };
        match serde_json::from_str::<HighScoreRecord>(&json) {
            Ok(record) => record.high_score,
            Err(e) => {
                log::warn!("Ignoring corrupt high score file: {}", e);
                0
            }
        }
    }

    fn save(&mut self, score: u32) {
        let record = HighScoreRecord { high_score: score };
        let json = match serde_json::to_string_pretty(&record) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not encode high score: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            log::warn!("Could not save high score to {}: {}", self.path.display(), e);
        } else {
            log::info!("High score saved ({})", score);
        }
    }
}
