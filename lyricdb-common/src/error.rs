//! Common error types for lyricdb

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common result type for lyricdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across lyricdb crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record with identical content already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Search index failure
    #[error("Search index error: {0}")]
    Search(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification carried on a failed envelope.
///
/// Callers map these onto transport status codes; this crate never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Duplicate content hash
    Conflict,
    /// Requested entity or search result absent
    NotFound,
    /// Malformed input
    ValidationError,
    /// Collaborator failure (store, search index, timeouts)
    ServerError,
}

impl Error {
    /// Classify this error for the envelope taxonomy
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Conflict(_) => ErrorCode::Conflict,
            Error::NotFound(_) => ErrorCode::NotFound,
            Error::InvalidInput(_) => ErrorCode::ValidationError,
            #[cfg(feature = "sqlx")]
            Error::Database(_) => ErrorCode::ServerError,
            Error::Io(_) | Error::Config(_) | Error::Search(_) | Error::Internal(_) => {
                ErrorCode::ServerError
            }
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::ServerError => "SERVER_ERROR",
        };
        f.write_str(name)
    }
}
