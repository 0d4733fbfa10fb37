//! Configuration loading and management
//!
//! Handles parsing of `.taskdeck.toml` configuration files.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tab opened when none is named
    #[serde(default = "default_tab")]
    pub default_tab: String,

    /// Identity configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Working-hours gate configuration
    #[serde(default)]
    pub hours: HoursConfig,

    /// Remote table configuration
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Local mirror configuration
    #[serde(default)]
    pub mirror: MirrorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_tab: default_tab(),
            identity: IdentityConfig::default(),
            hours: HoursConfig::default(),
            remote: RemoteConfig::default(),
            mirror: MirrorConfig::default(),
        }
    }
}

fn default_tab() -> String {
    "editor".to_string()
}

/// Identity-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Default user email when none specified
    #[serde(default = "default_user")]
    pub default: String,
}

fn default_user() -> String {
    "unknown".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            default: default_user(),
        }
    }
}

/// Working-hours window for the access gate
///
/// Users without the after-hours flag are only admitted between `open`
/// (inclusive) and `close` (exclusive), local time, Monday to Friday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursConfig {
    /// Opening time, "HH:MM"
    #[serde(default = "default_open")]
    pub open: String,

    /// Closing time, "HH:MM"
    #[serde(default = "default_close")]
    pub close: String,
}

fn default_open() -> String {
    "08:00".to_string()
}

fn default_close() -> String {
    "17:00".to_string()
}

impl Default for HoursConfig {
    fn default() -> Self {
        Self {
            open: default_open(),
            close: default_close(),
        }
    }
}

impl HoursConfig {
    pub fn open_time(&self) -> crate::error::Result<NaiveTime> {
        parse_time(&self.open, "hours.open")
    }

    pub fn close_time(&self) -> crate::error::Result<NaiveTime> {
        parse_time(&self.close, "hours.close")
    }
}

/// Remote table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote table service; empty disables remote sync
    #[serde(default)]
    pub url: String,

    /// Sub-table holding the task rows
    #[serde(default = "default_tasks_sheet")]
    pub tasks_sheet: String,

    /// Sub-table holding the role rows
    #[serde(default = "default_roles_sheet")]
    pub roles_sheet: String,

    /// Request timeout in seconds
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
}

fn default_tasks_sheet() -> String {
    "tasks".to_string()
}

fn default_roles_sheet() -> String {
    "roles".to_string()
}

fn default_remote_timeout() -> u64 {
    10
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            tasks_sheet: default_tasks_sheet(),
            roles_sheet: default_roles_sheet(),
            timeout_secs: default_remote_timeout(),
        }
    }
}

impl RemoteConfig {
    /// Remote sync is enabled only when a base URL is configured
    pub fn enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Local mirror configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Mirror file name under the state directory
    #[serde(default = "default_mirror_file")]
    pub file: String,

    /// Roles file name under the state directory
    #[serde(default = "default_roles_file")]
    pub roles_file: String,
}

fn default_mirror_file() -> String {
    "tasks.csv".to_string()
}

fn default_roles_file() -> String {
    "roles.csv".to_string()
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            file: default_mirror_file(),
            roles_file: default_roles_file(),
        }
    }
}

impl Config {
    /// Load configuration from a `.taskdeck.toml` file
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project root, or return defaults
    pub fn load_from_root(root: &PathBuf) -> Self {
        let config_path = root.join(".taskdeck.toml");
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &PathBuf) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.default_tab.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "default_tab cannot be empty".to_string(),
            ));
        }

        let open = self.hours.open_time()?;
        let close = self.hours.close_time()?;
        if open >= close {
            return Err(crate::error::Error::InvalidConfig(format!(
                "hours.open '{}' must be before hours.close '{}'",
                self.hours.open, self.hours.close
            )));
        }

        if self.remote.tasks_sheet.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "remote.tasks_sheet cannot be empty".to_string(),
            ));
        }
        if self.remote.roles_sheet.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "remote.roles_sheet cannot be empty".to_string(),
            ));
        }
        if self.remote.timeout_secs == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "remote.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.mirror.file.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "mirror.file cannot be empty".to_string(),
            ));
        }
        if self.mirror.roles_file.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "mirror.roles_file cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_time(value: &str, field: &str) -> crate::error::Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|err| {
        crate::error::Error::InvalidConfig(format!("{field}: invalid time '{value}': {err}"))
    })
}
