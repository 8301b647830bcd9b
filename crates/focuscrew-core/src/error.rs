//! Core error types for focuscrew-core.
//!
//! Every fallible operation in the library returns [`CoreError`] (or one of
//! the narrower enums below, which convert into it with `?`).

use std::path::PathBuf;
use thiserror::Error;

use crate::social::{FriendshipStatus, UserId};

/// Core error type for focuscrew-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Friend request / friendship errors
    #[error("Friendship error: {0}")]
    Friendship(#[from] FriendshipError),

    /// Countdown timer errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Leaderboard data source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

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

    /// Row not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint hit
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// No user selected (neither `--user` nor `account.user_id`)
    #[error("no user selected; pass --user or set account.user_id")]
    NoCurrentUser,
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Date string could not be parsed
    #[error("Invalid date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    /// Invalid time range
    #[error("Invalid time range: end_time ({end}) must not precede start_time ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Friendship invariant and transition errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FriendshipError {
    #[error("a user cannot befriend themselves ({0})")]
    SelfFriendship(UserId),

    #[error("friendship between {0} and {1} already exists")]
    AlreadyExists(UserId, UserId),

    #[error("no friendship between {0} and {1}")]
    NotFound(UserId, UserId),

    #[error("cannot {action} a {from} friendship")]
    InvalidTransition {
        from: FriendshipStatus,
        action: &'static str,
    },

    #[error("{user} is not allowed to {action} this request")]
    NotParticipant { user: UserId, action: &'static str },
}

/// Countdown timer errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimerError {
    #[error("invalid countdown: {minutes}m {seconds}s")]
    InvalidDuration { minutes: u32, seconds: u32 },

    #[error("timer driver has shut down")]
    DriverClosed,
}

/// Errors returned by a leaderboard data source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("profile not found: {0}")]
    ProfileNotFound(UserId),

    #[error("fetch for {user} timed out after {timeout:?}")]
    Timeout {
        user: UserId,
        timeout: std::time::Duration,
    },

    #[error("fetch failed: {0}")]
    Fetch(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
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

impl From<DatabaseError> for SourceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { id, .. } => SourceError::ProfileNotFound(UserId::new(id)),
            other => SourceError::Fetch(other.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
