//! TOML-based user preferences.
//!
//! Stores display and notification preferences for the hub shell:
//! - Theme and appearance settings
//! - Notification / celebration preferences
//! - Gamification display options (history window)
//!
//! Configuration is stored at `~/.config/sciencehub/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, CoreError};

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_dark_mode")]
    pub dark_mode: bool,
    #[serde(default = "default_accent_color")]
    pub highlight_color: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Show a celebration when a streak milestone is reached.
    #[serde(default = "default_true")]
    pub celebrate_milestones: bool,
}

/// Gamification display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationConfig {
    /// Number of days shown in the streak history calendar.
    #[serde(default = "default_history_window")]
    pub history_window_days: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/sciencehub/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub gamification: GamificationConfig,
}

// Default functions
fn default_dark_mode() -> bool {
    true
}
fn default_accent_color() -> String {
    "#3b82f6".into()
}
fn default_true() -> bool {
    true
}
fn default_history_window() -> u32 {
    30
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: default_dark_mode(),
            highlight_color: default_accent_color(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            celebrate_milestones: true,
        }
    }
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            history_window_days: default_history_window(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui: UiConfig::default(),
            notifications: NotificationsConfig::default(),
            gamification: GamificationConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.ui.dark_mode, true);
        assert_eq!(parsed.gamification.history_window_days, 30);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[ui]\ndark_mode = false\n").unwrap();
        assert_eq!(parsed.ui.dark_mode, false);
        assert_eq!(parsed.ui.highlight_color, "#3b82f6");
        assert!(parsed.notifications.celebrate_milestones);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.ui.dark_mode, true);
        assert_eq!(cfg.ui.highlight_color, "#3b82f6");
        assert_eq!(cfg.notifications.enabled, true);
        assert_eq!(cfg.gamification.history_window_days, 30);
    }
}
