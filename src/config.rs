use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "SPRITE_FOLLOWER_CONFIG";

/// How often the cursor is sampled.
const DEFAULT_SAMPLE_PERIOD_MS: u64 = 100;
/// Minimum per-sample travel (in pixels) along the dominant axis.
const DEFAULT_MOVE_THRESHOLD: f32 = 10.0;
/// Walk cycle frame period.
const DEFAULT_FRAME_PERIOD_MS: u64 = 150;
/// Fixed length of one walking episode.
const DEFAULT_EPISODE_MS: u64 = 600;
/// Menu-bar / tray icon edge in pixels.
const DEFAULT_ICON_SIZE: u32 = 32;
/// Sprite edge inside the enlarged view.
const DEFAULT_ENLARGED_SIZE: u32 = 128;
/// Enlarged view window edge.
const DEFAULT_ENLARGED_WINDOW_SIZE: u32 = 300;
/// Pixel size of the 4x4 sprite sheet.
const DEFAULT_SHEET_SIZE: u32 = 128;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunables for sampling, animation timing and display sizes.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to override:
///
/// ```toml
/// move_threshold = 6.0
/// episode_ms = 900
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FollowerConfig {
    pub sample_period_ms: u64,
    pub move_threshold: f32,
    pub frame_period_ms: u64,
    pub episode_ms: u64,
    pub icon_size: u32,
    pub enlarged_size: u32,
    pub enlarged_window_size: u32,
    pub sheet_width: u32,
    pub sheet_height: u32,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            sample_period_ms: DEFAULT_SAMPLE_PERIOD_MS,
            move_threshold: DEFAULT_MOVE_THRESHOLD,
            frame_period_ms: DEFAULT_FRAME_PERIOD_MS,
            episode_ms: DEFAULT_EPISODE_MS,
            icon_size: DEFAULT_ICON_SIZE,
            enlarged_size: DEFAULT_ENLARGED_SIZE,
            enlarged_window_size: DEFAULT_ENLARGED_WINDOW_SIZE,
            sheet_width: DEFAULT_SHEET_SIZE,
            sheet_height: DEFAULT_SHEET_SIZE,
        }
    }
}

impl FollowerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load from `$SPRITE_FOLLOWER_CONFIG` if set, falling back to defaults
    /// when the variable is unset or the file is rejected.
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            log::info!("No {CONFIG_ENV} set, using default config");
            return Self::default();
        };
        let path = Path::new(&path);
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("sample_period_ms", self.sample_period_ms),
            ("frame_period_ms", self.frame_period_ms),
            ("episode_ms", self.episode_ms),
        ];
        for (field, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero",
                });
            }
        }
        if !self.move_threshold.is_finite() || self.move_threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "move_threshold",
                reason: "must be a positive, finite distance",
            });
        }
        let sizes = [
            ("icon_size", self.icon_size),
            ("enlarged_size", self.enlarged_size),
            ("enlarged_window_size", self.enlarged_window_size),
            ("sheet_width", self.sheet_width),
            ("sheet_height", self.sheet_height),
        ];
        for (field, value) in sizes {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero",
                });
            }
        }
        Ok(())
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_period_ms)
    }

    pub fn episode_duration(&self) -> Duration {
        Duration::from_millis(self.episode_ms)
    }
}
