use std::result;

use crate::retry::RetryableError;
use crate::source::Source;
use thiserror::Error;

/// Error types for fetch-and-normalize operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegbotError {
    /// A query key the chosen source does not recognize
    #[error("Unsupported parameter for {api}: {key}")]
    UnsupportedParameter { api: Source, key: String },

    /// Query parameters that are recognized but cannot form a valid request
    #[error("Invalid parameters for {api}: {reason}")]
    InvalidParameters { api: Source, reason: String },

    /// The source rejected the request as malformed
    #[error("{api} rejected the query ({status}): {message}")]
    InvalidQuery {
        api: Source,
        status: u16,
        message: String,
    },

    /// Network or server-side failure, safe to retry with backoff
    #[error("Transient error from {api}: {message}")]
    TransientSourceError {
        api: Source,
        status: Option<u16>,
        message: String,
    },

    /// Pagination metadata did not advance
    #[error("Pagination loop detected for {api} at cursor {cursor}")]
    PaginationLoopDetected { api: Source, cursor: String },

    /// A raw record that cannot be normalized at all
    #[error("Malformed {api} record: {reason}")]
    MalformedRecord { api: Source, reason: String },
}

pub type Result<T> = result::Result<T, RegbotError>;

impl RetryableError for RegbotError {
    fn is_retryable(&self) -> bool {
        match self {
            RegbotError::TransientSourceError { .. } => true,

            RegbotError::UnsupportedParameter { .. }
            | RegbotError::InvalidParameters { .. }
            | RegbotError::InvalidQuery { .. }
            | RegbotError::PaginationLoopDetected { .. }
            | RegbotError::MalformedRecord { .. } => false,
        }
    }

    fn retry_reason(&self) -> &str {
        match self {
            RegbotError::TransientSourceError { status, .. } => match status {
                Some(429) => "Rate limit exceeded",
                Some(500..=599) => "Server error",
                _ => "Network error",
            },
            RegbotError::UnsupportedParameter { .. } | RegbotError::InvalidParameters { .. } => {
                "Invalid input"
            }
            RegbotError::InvalidQuery { .. } => "Invalid query",
            RegbotError::PaginationLoopDetected { .. } => "Source pagination contract violated",
            RegbotError::MalformedRecord { .. } => "Invalid record",
        }
    }
}
