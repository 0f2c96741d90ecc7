//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blockfall/settings.toml (or platform equivalent).
//! The `[storage]` table doubles as the key/value store the game uses for its
//! best score.

use crate::game::GameConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key for the best falling-block score
pub const BEST_SCORE_KEY: &str = "tetris.best_score";

/// Errors from loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Read-or-default / write storage for small integer values
pub trait KeyValueStore {
    fn get_or(&self, key: &str, default: u64) -> u64;
    fn set(&mut self, key: &str, value: u64);
}

/// Store `score` as the best score if it beats the current one.
/// Returns true when a new best was recorded.
pub fn record_best_score(store: &mut impl KeyValueStore, score: u64) -> bool {
    if score <= store.get_or(BEST_SCORE_KEY, 0) {
        return false;
    }
    store.set(BEST_SCORE_KEY, score);
    true
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gameplay settings
    pub gameplay: GameplaySettings,
    /// Demo autoplayer settings
    pub autoplay: AutoplaySettings,
    /// Persisted key/value pairs
    pub storage: BTreeMap<String, u64>,
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// How long completed rows are shown before removal, in milliseconds
    pub clear_delay_ms: u64,
    /// Fixed piece sequence seed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Autoplayer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplaySettings {
    /// Time between autoplayer commands in milliseconds
    pub action_interval_ms: u64,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            clear_delay_ms: 500,
            seed: None,
        }
    }
}

impl Default for AutoplaySettings {
    fn default() -> Self {
        Self {
            action_interval_ms: 150,
        }
    }
}

impl KeyValueStore for Settings {
    fn get_or(&self, key: &str, default: u64) -> u64 {
        self.storage.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: u64) {
        self.storage.insert(key.to_string(), value);
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("no config directory, using default settings");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file yet");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), "ignoring settings file: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Engine configuration from the gameplay section
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            clear_delay: Duration::from_millis(self.gameplay.clear_delay_ms),
            seed: self.gameplay.seed,
        }
    }

    /// Best recorded score, 0 if none
    pub fn best_score(&self) -> u64 {
        self.get_or(BEST_SCORE_KEY, 0)
    }
}
