//! Error types for focusdeck-core

use thiserror::Error;

/// Main error type for the focusdeck-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Request rejected before persistence
    #[error("validation error: {0}")]
    Validation(String),

    /// Subject not found
    #[error("subject not found: {0}")]
    SubjectNotFound(String),
}

/// Result type alias for focusdeck-core
pub type Result<T> = std::result::Result<T, Error>;
