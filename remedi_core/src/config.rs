//! Configuration file support for Remedi.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/remedi/config.toml`.

use crate::{Error, Result, StatusConfig, DEFAULT_STATUS_CONFIG};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub windows: WindowsConfig,
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

/// Pending window configuration, in minutes around the scheduled time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WindowsConfig {
    #[serde(default = "default_pending_before")]
    pub pending_before_minutes: u32,

    #[serde(default = "default_pending_after")]
    pub pending_after_minutes: u32,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            pending_before_minutes: default_pending_before(),
            pending_after_minutes: default_pending_after(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("remedi")
}

fn default_pending_before() -> u32 {
    DEFAULT_STATUS_CONFIG.pending_window_before
}

fn default_pending_after() -> u32 {
    DEFAULT_STATUS_CONFIG.pending_window_after
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("remedi").join("config.toml")
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

    /// The status window policy configured for this installation.
    ///
    /// A zero after-window makes every late dose missed instantly, which is
    /// almost never what the user wants, so it gets a warning.
    pub fn status_config(&self) -> StatusConfig {
        if self.windows.pending_after_minutes == 0 {
            tracing::warn!("pending_after_minutes is 0: doses become missed the minute they pass");
        }

        StatusConfig {
            pending_window_before: self.windows.pending_before_minutes,
            pending_window_after: self.windows.pending_after_minutes,
        }
    }
}
