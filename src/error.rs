//! Error types.
//!
//! Capability failures come from the platform collaborators, configuration
//! errors from loading or validating settings, and statistics errors from the
//! usage database. `ServiceError` is what the orchestrator surfaces.

use thiserror::Error;

/// A collaborator (cursor, audio, window, ...) could not do its job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The capability does not exist on this platform.
    #[error("{capability} is not available on this platform")]
    Unavailable {
        /// Name of the missing capability.
        capability: &'static str,
    },

    /// The capability exists but the call failed.
    #[error("{capability} failed: {message}")]
    Failed {
        /// Name of the failing capability.
        capability: &'static str,
        /// Platform error text.
        message: String,
    },
}

impl CapabilityError {
    pub fn failed(capability: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            capability,
            message: message.into(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An interval that must be positive was not.
    #[error("invalid interval for {field}: {value}")]
    InvalidInterval { field: &'static str, value: u32 },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by the usage statistics store.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("usage database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A thread panicked while holding the store lock.
    #[error("usage store lock poisoned")]
    Poisoned,

    /// Any other collector-specific failure.
    #[error("statistics collector failed: {0}")]
    Collector(String),
}

/// Errors surfaced by the reminder service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("window manager error: {0}")]
    Window(#[source] CapabilityError),
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
