//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/focusdeck/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/focusdeck/` (~/.config/focusdeck/)
//! - Data: `$XDG_DATA_HOME/focusdeck/` (~/.local/share/focusdeck/)
//! - State/Logs: `$XDG_STATE_HOME/focusdeck/` (~/.local/state/focusdeck/)

use crate::error::{Error, Result};
use crate::types::TimerSettings;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Timer defaults used before a user has stored settings
    #[serde(default)]
    pub timer: TimerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// User identity for the local single-user deployment
    #[serde(default)]
    pub user: UserConfig,
}

/// Timer duration defaults (minutes) and chaining flags.
///
/// These seed `user_settings` on first use; afterwards the stored row wins.
#[derive(Debug, Deserialize, Clone)]
pub struct TimerConfig {
    #[serde(default = "default_study_duration")]
    pub study_duration: i64,

    #[serde(default = "default_short_break")]
    pub short_break: i64,

    #[serde(default = "default_long_break")]
    pub long_break: i64,

    #[serde(default)]
    pub auto_start_breaks: bool,

    #[serde(default)]
    pub auto_start_pomodoros: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            study_duration: default_study_duration(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            auto_start_breaks: false,
            auto_start_pomodoros: false,
        }
    }
}

impl TimerConfig {
    /// Convert to the domain settings type (notifications on by default)
    pub fn to_settings(&self) -> TimerSettings {
        TimerSettings {
            study_duration: self.study_duration,
            short_break: self.short_break,
            long_break: self.long_break,
            auto_start_breaks: self.auto_start_breaks,
            auto_start_pomodoros: self.auto_start_pomodoros,
            notifications_enabled: true,
        }
    }
}

fn default_study_duration() -> i64 {
    25
}

fn default_short_break() -> i64 {
    5
}

fn default_long_break() -> i64 {
    15
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Identity of the local user owning subjects and sessions
#[derive(Debug, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

fn default_user_id() -> String {
    "local".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/focusdeck/config.toml` (~/.config/focusdeck/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("focusdeck").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/focusdeck/` (~/.local/share/focusdeck/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("focusdeck")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/focusdeck/` (~/.local/state/focusdeck/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("focusdeck")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/focusdeck/data.db` (~/.local/share/focusdeck/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/focusdeck/focusdeck.log` (~/.local/state/focusdeck/focusdeck.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("focusdeck.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timer.study_duration, 25);
        assert_eq!(config.timer.short_break, 5);
        assert_eq!(config.timer.long_break, 15);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.user.id, "local");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[timer]
study_duration = 50
short_break = 10
auto_start_breaks = true

[logging]
level = "debug"

[user]
id = "alice"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.timer.study_duration, 50);
        assert_eq!(config.timer.short_break, 10);
        // Unspecified fields fall back to defaults
        assert_eq!(config.timer.long_break, 15);
        assert!(config.timer.auto_start_breaks);
        assert!(!config.timer.auto_start_pomodoros);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.user.id, "alice");
    }

    #[test]
    fn test_timer_config_to_settings() {
        let settings = TimerConfig::default().to_settings();
        assert_eq!(settings, crate::types::TimerSettings::default());
    }
}
