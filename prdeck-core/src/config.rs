//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/prdeck/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/prdeck/` (~/.config/prdeck/)
//! - State/Logs: `$XDG_STATE_HOME/prdeck/` (~/.local/state/prdeck/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

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

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Backend server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Timing and paging knobs for the sync layer
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dashboard backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Base URL of the REST API, including the `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5050/api".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Sync layer timings
#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Interval between active review polls while any review is running
    #[serde(default = "default_review_poll_interval")]
    pub review_poll_interval_ms: u64,

    /// Quiet period before a settings snapshot is saved
    #[serde(default = "default_settings_debounce")]
    pub settings_debounce_ms: u64,

    /// Delay between restoring the repo selection and applying saved filters
    #[serde(default = "default_restore_filter_delay")]
    pub restore_filter_delay_ms: u64,

    /// Rows per page for paginated slices
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Max repositories requested per account
    #[serde(default = "default_repo_list_limit")]
    pub repo_list_limit: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            review_poll_interval_ms: default_review_poll_interval(),
            settings_debounce_ms: default_settings_debounce(),
            restore_filter_delay_ms: default_restore_filter_delay(),
            page_size: default_page_size(),
            repo_list_limit: default_repo_list_limit(),
        }
    }
}

fn default_review_poll_interval() -> u64 {
    5000
}

fn default_settings_debounce() -> u64 {
    1000
}

fn default_restore_filter_delay() -> u64 {
    100
}

fn default_page_size() -> usize {
    25
}

fn default_repo_list_limit() -> u32 {
    100
}

impl SyncConfig {
    pub fn review_poll_interval(&self) -> Duration {
        Duration::from_millis(self.review_poll_interval_ms)
    }

    pub fn settings_debounce(&self) -> Duration {
        Duration::from_millis(self.settings_debounce_ms)
    }

    pub fn restore_filter_delay(&self) -> Duration {
        Duration::from_millis(self.restore_filter_delay_ms)
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file name inside the state directory
    #[serde(default = "default_log_file")]
    pub file_name: String,

    /// How often the log file rolls over
    #[serde(default)]
    pub rotation: LogRotation,

    /// Also log to stderr at this level (set by `-v` on the command line)
    #[serde(default)]
    pub stderr_level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_name: default_log_file(),
            rotation: LogRotation::default(),
            stderr_level: None,
        }
    }
}

/// Log file rotation period
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "prdeck.log".to_string()
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
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(Error::Config("server.base_url must not be empty".to_string()));
        }
        if self.server.timeout_secs == 0 {
            return Err(Error::Config(
                "server.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.sync.review_poll_interval_ms == 0 || self.sync.settings_debounce_ms == 0 {
            return Err(Error::Config(
                "sync intervals must be greater than 0".to_string(),
            ));
        }
        if self.sync.page_size == 0 {
            return Err(Error::Config("sync.page_size must be at least 1".to_string()));
        }
        let file_name = self.logging.file_name.trim();
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "logging.file_name must be a plain file name, got '{}'",
                self.logging.file_name
            )));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/prdeck/config.toml` (~/.config/prdeck/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("prdeck").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/prdeck/` (~/.local/state/prdeck/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("prdeck")
    }

    /// Returns the configured log file path
    ///
    /// Rotated files carry a date suffix after this name.
    pub fn log_path(&self) -> PathBuf {
        Self::state_dir().join(&self.logging.file_name)
    }
}
