//! Core error types for habitkeeper-core.
//!
//! This module defines the error hierarchy using thiserror. Storage-level
//! methods return `rusqlite::Error` directly; everything above them converts
//! into [`CoreError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::habit::Frequency;

/// Core error type for habitkeeper-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (contract violations, never silently recovered)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Account and session errors
    #[error("Account error: {0}")]
    Auth(#[from] AuthError),

    /// The named habit does not exist for the session user
    #[error("Habit '{name}' not found")]
    HabitNotFound { name: String },

    /// A habit with the same (name, owner, frequency) already exists
    #[error("Habit '{name}' ({frequency}) already exists")]
    DuplicateHabit { name: String, frequency: Frequency },

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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
///
/// These signal caller bugs (a clock running backwards, malformed values),
/// not runtime conditions, and are fatal to the calling operation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// `now` precedes the stored last completion time
    #[error("Invalid time range: now ({now}) must not precede last completion ({last})")]
    InvalidTimeRange {
        last: chrono::NaiveDateTime,
        now: chrono::NaiveDateTime,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Account and session errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Registration or rename with a username that is already taken
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    /// Login with a wrong username/password pair
    #[error("Username or password is incorrect")]
    InvalidCredentials,

    /// Password fails the configured policy
    #[error("Password does not meet the policy: {0}")]
    WeakPassword(String),

    /// An operation that needs a session was called without one
    #[error("Not signed in")]
    NotSignedIn,
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
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
