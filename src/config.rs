//! Application configuration.
//!
//! The configuration is a read-only snapshot for the lifetime of the service.
//! Only the reminder interval can change afterwards, through
//! `ReminderService::set_warn_time`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides [`Config::profile`].
pub const PROFILE_ENV: &str = "EYEGUARD_PROFILE";

/// Name of the rest prompt window.
pub const TIP_WINDOW: &str = "TipWindow";

/// Which set of timer intervals to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalProfile {
    /// Production intervals.
    #[default]
    Normal,
    /// Short intervals for manual testing.
    Accelerated,
}

impl std::str::FromStr for IntervalProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "accelerated" | "debug" => Ok(Self::Accelerated),
            other => Err(format!("unknown interval profile: {other}")),
        }
    }
}

/// User settings consumed by the reminder service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minutes between rest reminders.
    pub warn_time: u32,

    /// Whether leave/return detection is on.
    pub leave_listener: bool,

    /// Whether eye usage statistics are collected.
    pub collect_usage_data: bool,

    /// When set, a due reminder shows nothing.
    #[serde(alias = "noreset")]
    pub suppress_prompt: bool,

    pub profile: IntervalProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warn_time: 20,
            leave_listener: true,
            collect_usage_data: true,
            suppress_prompt: false,
            profile: IntervalProfile::Normal,
        }
    }
}

impl Config {
    /// Default config file location: `<config_dir>/eyeguard/config.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eyeguard")
            .join("config.json")
    }

    /// Loads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the default config file, falling back to defaults if it is
    /// missing, then applies the profile override from the environment.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            tracing::info!(path = ?path, "Loading configuration");
            Self::load(&path)?
        } else {
            tracing::info!(path = ?path, "No config file, using defaults");
            Self::default()
        };

        if let Ok(value) = std::env::var(PROFILE_ENV) {
            match value.parse() {
                Ok(profile) => config.profile = profile,
                Err(e) => tracing::warn!(error = %e, "Ignoring {}", PROFILE_ENV),
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_minutes("warn_time", self.warn_time)?;
        Ok(())
    }
}

pub(crate) fn validate_minutes(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidInterval { field, value });
    }
    Ok(())
}

pub(crate) fn minutes(value: u32) -> Duration {
    Duration::from_secs(u64::from(value) * 60)
}

/// Concrete intervals for the five service timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerIntervals {
    pub reminder: Duration,
    pub leave: Duration,
    pub return_check: Duration,
    pub busy: Duration,
    pub usage: Duration,
}

impl TimerIntervals {
    pub fn for_config(config: &Config) -> Self {
        match config.profile {
            IntervalProfile::Normal => Self {
                reminder: minutes(config.warn_time),
                leave: minutes(5),
                return_check: minutes(1),
                busy: Duration::from_secs(30),
                usage: minutes(30),
            },
            IntervalProfile::Accelerated => Self {
                reminder: Duration::from_secs(30),
                leave: Duration::from_secs(20),
                return_check: Duration::from_secs(10),
                busy: Duration::from_secs(30),
                usage: minutes(1),
            },
        }
    }
}
