//! Core error types for restwise-core.
//!
//! The analysis functions themselves are infallible; these errors cover
//! configuration, user input, timetable files and the external explanation
//! service.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for restwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Explanation service errors
    #[error("Explanation error: {0}")]
    Explain(#[from] ExplainError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be created
    #[error("Cannot prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be after start ({start})")]
    InvalidTimeRange { start: String, end: String },

    /// Time that does not parse as HH:MM
    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),

    /// Date that does not parse as YYYY-MM-DD
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Failures of the external explanation service.
///
/// These never reach callers of the explaining classifier; they are logged
/// and replaced by a fallback reason.
#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned status {status}")]
    Status { status: u16 },

    #[error("No reply within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Malformed reply: {0}")]
    Malformed(String),

    #[error("Reply length {len} outside accepted bounds")]
    OutOfBounds { len: usize },

    #[error("Service is cooling down after a recent failure")]
    CoolingDown,

    #[error("Explanation service disabled")]
    Disabled,

    #[error("API key environment variable '{0}' is not set")]
    MissingApiKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
