//! Core error types for calmdrive-core.
//!
//! Every failure in the library is "log and continue" or "propagate once to
//! the immediate caller"; none of these are process-fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for calmdrive-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Media resolution errors
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Media resolution errors.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The path had no usable final segment to use as an object key
    #[error("No usable object key in path '{path}'")]
    EmptyKey { path: String },

    /// Storage answered but refused the object
    #[error("Storage lookup for '{bucket}/{key}' failed: HTTP {status}")]
    Storage {
        bucket: String,
        key: String,
        status: u16,
    },

    /// Transport-level failure talking to storage
    #[error("Storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage base URL or object URL could not be built
    #[error("Invalid storage URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Audio playback errors reported by an [`crate::guidance::AudioPlayer`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The clip could not be loaded
    #[error("Failed to load '{src}': {message}")]
    Load { src: String, message: String },

    /// Playback was rejected (autoplay policy, decode error, ...)
    #[error("Playback rejected: {0}")]
    Rejected(String),
}

/// Device orientation-lock errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrientationError {
    /// The device has no orientation lock API
    #[error("Orientation lock is not supported on this device")]
    Unsupported,

    /// The user or platform denied the lock
    #[error("Orientation lock denied: {0}")]
    Denied(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Unknown exercise identifier
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
