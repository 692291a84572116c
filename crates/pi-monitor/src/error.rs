//! Error types for Pi Monitor
//!
//! `MonitorError` covers configuration problems and contract violations.
//! Remote failures have their own types (`ClientError`, `NotifyError`) and
//! are converted to "no state change" at the call site rather than
//! propagated.

use thiserror::Error;

/// Main error type
#[derive(Error, Debug)]
pub enum MonitorError {
    /// A status value outside the canonical vocabulary was used internally.
    ///
    /// This is a programmer error, not a transient condition.
    #[error("Invalid status '{value}'.  Valid values are {allowed}")]
    InvalidStatus { value: String, allowed: String },

    /// Configuration could not be parsed or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl MonitorError {
    /// Create an invalid status error listing the accepted values
    pub fn invalid_status(value: impl Into<String>, allowed: &[&str]) -> Self {
        MonitorError::InvalidStatus {
            value: value.into(),
            allowed: format!("{:?}", allowed),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        MonitorError::Config(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(self, MonitorError::Config(_) | MonitorError::Io(_))
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for MonitorError {
    fn from(err: serde_yaml::Error) -> Self {
        MonitorError::Config(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for MonitorError {
    fn from(err: toml::de::Error) -> Self {
        MonitorError::Config(format!("TOML error: {}", err))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MonitorError>;
