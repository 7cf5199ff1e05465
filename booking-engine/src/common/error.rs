//! Unified Error Handling
//!
//! Engine-level error taxonomy exposed to the booking workflow.

use thiserror::Error;

use crate::db::repository::RepoError;

/// Engine-level error type
///
/// - `InvalidInput` - caller error (bad date/meal/party size), not retryable
/// - `Conflict` - slot capacity consumed by a concurrent commit; the caller
///   should re-query and let the user pick again
/// - `Configuration` - malformed schedule/closure data; the affected day or
///   slot is treated as closed instead of failing the whole query
/// - `Storage` - transaction/commit failure, retryable
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Slot conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngineError {
    /// Whether the caller may retry the same call unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Storage(_))
    }
}

impl From<RepoError> for EngineError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => EngineError::InvalidInput(msg),
            RepoError::Duplicate(msg) => EngineError::Conflict(msg),
            RepoError::Validation(msg) => EngineError::Configuration(msg),
            RepoError::Database(msg) => EngineError::Storage(msg),
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Storage(err.to_string())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
