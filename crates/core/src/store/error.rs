//! Storage error type.

use thiserror::Error;

/// Failure reported by a store implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Serialization failure or lost race with a concurrent writer.
    #[error("Concurrent modification detected, please retry: {0}")]
    Conflict(String),

    /// Write attempted inside a read-only transaction.
    #[error("Write attempted in a read-only transaction")]
    ReadOnly,

    /// The underlying database reported an error.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be mapped back into a domain value.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Conflict(_) => "CONCURRENT_MODIFICATION",
            Self::ReadOnly => "READ_ONLY_TRANSACTION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Conflict(_) => 409,
            Self::ReadOnly | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if repeating the whole operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
