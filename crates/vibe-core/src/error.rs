//! Core error types for vibe-core.
//!
//! This module defines the error hierarchy using thiserror. The gate has
//! exactly one failure mode (construction-time validation); everything else
//! belongs to the collaborators around it.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for vibe-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session window gate errors
    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

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

/// Session window gate errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// The window cannot be built from the supplied parameters.
    #[error("Invalid gate configuration (total_duration_secs = {total_duration_secs}): {reason}")]
    InvalidConfiguration {
        total_duration_secs: u64,
        reason: String,
    },
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Session store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store
    #[error("Failed to open session store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Session store is locked")]
    Locked,

    /// A stored record did not pass validation on read
    #[error("Corrupt record for key '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// The on-disk schema is newer than this build understands
    #[error("Unsupported store schema version {found} (expected <= {supported})")]
    SchemaMismatch { found: u32, supported: u32 },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Challenge id not present in the catalog
    #[error("Unknown challenge: {0}")]
    UnknownChallenge(String),

    /// Submission type does not match the challenge kind
    #[error("Challenge '{challenge}' expects a {expected} submission")]
    SubmissionMismatch { challenge: String, expected: String },

    /// Submission carries no content
    #[error("Submission for '{0}' is empty")]
    EmptySubmission(String),

    /// Challenge was already completed
    #[error("Challenge '{0}' is already completed")]
    AlreadyCompleted(String),

    /// No completed challenge; the feed stays locked
    #[error("Feed is locked: complete today's challenge first")]
    FeedLocked,

    /// Fewer interests than required
    #[error("Select at least {required} interests (got {got})")]
    TooFewInterests { required: usize, got: usize },

    /// Interest id not present in the catalog
    #[error("Unknown interest: {0}")]
    UnknownInterest(String),

    /// Same interest listed twice
    #[error("Duplicate interest: {0}")]
    DuplicateInterest(String),

    /// Rating outside 1..=5
    #[error("Rating for '{interest}' must be between 1 and 5 (got {rating})")]
    RatingOutOfRange { interest: String, rating: u8 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseLocked => {
                StoreError::Locked
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
