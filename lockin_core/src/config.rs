//! Configuration file support for LockIn.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lockin/config.toml`.

use crate::history::{validate_window, DEFAULT_WINDOW_DAYS};
use crate::{Error, Result, Settings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub progress: ProgressConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Durations used to seed a store that has never been saved
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,

    #[serde(default = "default_rest_minutes")]
    pub rest_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            rest_minutes: default_rest_minutes(),
        }
    }
}

impl TimerConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            work_duration: self.work_minutes.saturating_mul(60),
            rest_duration: self.rest_minutes.saturating_mul(60),
        }
    }
}

/// Completion alert configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Ring the terminal bell along with the message
    #[serde(default = "default_true")]
    pub bell: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
        }
    }
}

/// Progress view configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_heatmap_days")]
    pub heatmap_days: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            heatmap_days: default_heatmap_days(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("lockin")
}

fn default_work_minutes() -> u32 {
    60
}

fn default_rest_minutes() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_heatmap_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the timer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.timer.work_minutes == 0 {
            return Err(Error::Config("timer.work_minutes must be at least 1".into()));
        }
        if self.timer.rest_minutes == 0 {
            return Err(Error::Config("timer.rest_minutes must be at least 1".into()));
        }
        if let Err(e) = validate_window(self.progress.heatmap_days) {
            return Err(Error::Config(format!("progress.heatmap_days: {}", e)));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("lockin").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
