//! Error types for the myschedule-rust library.
//!
//! The extraction and encoding pipeline itself never fails on bad rows; these
//! errors cover the edges around it: configuration, the keyed schedule store,
//! and reading or writing files.

use thiserror::Error;

/// Errors that can occur in the myschedule-rust application.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Schedule store errors
    #[error("Store error: {0}")]
    Store(String),

    /// A stored schedule was requested that does not exist
    #[error("Schedule not found: {0}")]
    NotFound(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid user-supplied input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with ScheduleError
pub type Result<T> = std::result::Result<T, ScheduleError>;

impl From<sled::Error> for ScheduleError {
    fn from(err: sled::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<regex::Error> for ScheduleError {
    fn from(err: regex::Error) -> Self {
        Self::Other(format!("Failed to compile pattern: {err}"))
    }
}
