//! Configuration for the HandPlay gesture engine.

use crate::core::engine::EngineConfig;
use crate::source::types::{HandIdentity, Handedness};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Main configuration for a gesture session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classifier thresholds and timing
    pub engine: EngineConfig,

    /// Which hands to feed to the engine
    pub hands: HandFilter,

    /// Frames per second produced by the synthetic source
    pub frame_rate: u32,

    /// Slots accepted per handedness; frames for higher slots are dropped
    pub max_hands: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            hands: HandFilter::default(),
            frame_rate: 30,
            max_hands: 1,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults if it is absent.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content).map_err(ConfigError::Parse)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("handplay-gesture-engine")
            .join("config.json")
    }

    /// Whether frames from this hand should reach the engine.
    pub fn accepts(&self, hand: &HandIdentity) -> bool {
        self.hands.allows(hand.handedness) && hand.slot < self.max_hands
    }
}

/// Which handedness values to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandFilter {
    pub left: bool,
    pub right: bool,
}

impl Default for HandFilter {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
        }
    }
}

impl HandFilter {
    /// Parse a hand filter from a comma-separated string.
    pub fn from_csv(s: &str) -> Self {
        let hands: Vec<String> = s.split(',').map(|s| s.trim().to_lowercase()).collect();

        Self {
            left: hands.iter().any(|s| s == "left" || s == "all"),
            right: hands.iter().any(|s| s == "right" || s == "all"),
        }
    }

    /// Check if at least one hand is enabled.
    pub fn any_enabled(&self) -> bool {
        self.left || self.right
    }

    pub fn allows(&self, handedness: Handedness) -> bool {
        match handedness {
            Handedness::Left => self.left,
            Handedness::Right => self.right,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Serde support for `Duration` as integer milliseconds.
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Convert a configured duration for arithmetic against frame timestamps.
pub(crate) fn chrono_duration(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}
