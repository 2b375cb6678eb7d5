//! Configuration management for StemSplit
//!
//! This module handles loading and managing application configuration
//! from config files and environment variables.

use crate::player::AdvanceMode;
use crate::utils::error::{IntoStemSplitError, Result, StemSplitError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest upload limit whose byte count fits in a `u64` (1 TiB)
pub const MAX_UPLOAD_MB: u64 = 1024 * 1024;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Player widget configuration
    pub player: PlayerConfig,

    /// Demo separation job configuration
    pub separation: SeparationConfig,

    /// General application settings
    pub general: GeneralConfig,
}

/// Player widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Duration assumed until the media reports one, in seconds
    pub default_duration: f64,

    /// Initial volume (0 - 100)
    pub default_volume: u8,

    /// Simulated advance per frame, in seconds
    pub tick_step: f64,

    /// Frame cadence of the simulated clock, in milliseconds
    pub frame_interval_ms: u64,

    /// How the simulated clock advances
    pub advance_mode: AdvanceMode,
}

/// Demo separation job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    /// Upload limit in MiB
    pub max_upload_mb: u64,

    /// Instruments extracted when the request names none
    pub default_instruments: Vec<String>,

    /// Base URL of the fake output bucket
    pub output_base_url: String,
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_duration: 204.0,
            default_volume: 75,
            tick_step: 0.1,
            frame_interval_ms: 16, // ~60 FPS
            advance_mode: AdvanceMode::FixedStep,
        }
    }
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: 100,
            default_instruments: vec![
                "vocals".to_string(),
                "drums".to_string(),
                "bass".to_string(),
                "other".to_string(),
            ],
            output_base_url: "https://demo.stemsplit.com/output".to_string(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. The explicit `path`, or the user config file (~/.config/stemsplit/config.toml on Linux)
    /// 3. Environment variables (STEMSPLIT_* prefix)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(StemSplitError::NotFound(format!(
                        "config file {}",
                        path.display()
                    )));
                }
                config.merge_from_file(path)?;
            }
            None => {
                if let Some(user_path) = Self::user_config_path() {
                    if user_path.exists() {
                        config.merge_from_file(&user_path)?;
                    }
                }
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| StemSplitError::Config("Cannot determine user config path".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;
        std::fs::write(path, toml).config_err("Failed to write config file")?;

        Ok(())
    }

    /// Merge configuration from a TOML file
    ///
    /// Keys missing from the file keep their current defaults.
    fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path).config_err("Failed to read config file")?;
        *self = toml::from_str(&contents).config_err("Failed to parse config file")?;
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // Example: STEMSPLIT_VOLUME=40
        if let Ok(volume) = std::env::var("STEMSPLIT_VOLUME") {
            self.player.default_volume = volume
                .parse()
                .map_err(|_| StemSplitError::Config("Invalid STEMSPLIT_VOLUME".to_string()))?;
        }

        if let Ok(step) = std::env::var("STEMSPLIT_TICK_STEP") {
            self.player.tick_step = step
                .parse()
                .map_err(|_| StemSplitError::Config("Invalid STEMSPLIT_TICK_STEP".to_string()))?;
        }

        if let Ok(mode) = std::env::var("STEMSPLIT_ADVANCE_MODE") {
            self.player.advance_mode = match mode.as_str() {
                "fixed_step" => AdvanceMode::FixedStep,
                "wall_clock" => AdvanceMode::WallClock,
                _ => {
                    return Err(StemSplitError::Config(
                        "Invalid STEMSPLIT_ADVANCE_MODE".to_string(),
                    ))
                }
            };
        }

        if let Ok(log_level) = std::env::var("STEMSPLIT_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(self.player.default_duration.is_finite() && self.player.default_duration > 0.0) {
            return Err(StemSplitError::Config(
                "Default duration must be a positive number of seconds".to_string(),
            ));
        }

        if self.player.default_volume > 100 {
            return Err(StemSplitError::Config(
                "Default volume must be between 0 and 100".to_string(),
            ));
        }

        if !(self.player.tick_step.is_finite() && self.player.tick_step > 0.0) {
            return Err(StemSplitError::Config("Tick step must be positive".to_string()));
        }

        if self.player.frame_interval_ms == 0 {
            return Err(StemSplitError::Config("Frame interval must be non-zero".to_string()));
        }

        if self.separation.max_upload_mb == 0 {
            return Err(StemSplitError::Config("Upload limit must be non-zero".to_string()));
        }

        if self.separation.max_upload_mb > MAX_UPLOAD_MB {
            return Err(StemSplitError::Config(format!(
                "Upload limit must be at most {}MB",
                MAX_UPLOAD_MB
            )));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(StemSplitError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stemsplit").join("config.toml"))
    }
}
