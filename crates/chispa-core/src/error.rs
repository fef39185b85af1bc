//! Error types for the Chispa reading pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire reading pipeline.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Transport failures keep
/// their own taxonomy (`Timeout`, `RequestFailed`); per-endpoint fetch
/// classifications wrap everything else.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ChispaError {
    /// Card text could not be fetched or decoded
    #[error("Text fetch error: {0}")]
    TextFetch(String),

    /// Card image could not be fetched or decoded
    #[error("Image fetch error: {0}")]
    ImageFetch(String),

    /// Chat reply could not be fetched or decoded
    #[error("Chat fetch error: {0}")]
    ChatFetch(String),

    /// The request exceeded the configured hard timeout
    #[error("Request timeout")]
    Timeout,

    /// Network failure or non-2xx response from the backend
    #[error("Request failed: {message}")]
    RequestFailed {
        /// HTTP status, when the backend answered at all
        status: Option<u16>,
        message: String,
    },

    /// The call was aborted by its cancellation token
    #[error("Request cancelled")]
    Cancelled,

    /// A slot index outside the dealt spread
    #[error("Invalid index {index} (spread has {len} cards)")]
    InvalidIndex { index: usize, len: usize },

    /// Caller-supplied input that cannot be acted on (e.g. a blank question)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChispaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a RequestFailed error
    pub fn request_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates an InvalidIndex error
    pub fn invalid_index(index: usize, len: usize) -> Self {
        Self::InvalidIndex { index, len }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Check if this is a Cancelled error
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this error carries a definitive 404 from the backend
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RequestFailed { status: Some(404), .. })
    }

    /// Whether the HTTP client should retry after this error.
    ///
    /// Network failures and non-2xx statuses are retryable, with two
    /// exceptions: a 404 is a definitive "not found", and a timeout is
    /// terminal (the hard timeout already bounded the whole attempt).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed { status, .. } => *status != Some(404),
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<reqwest::Error> for ChispaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::RequestFailed {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ChispaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Conversion from anyhow::Error (transitional, should be removed eventually)
impl From<anyhow::Error> for ChispaError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for ChispaError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, ChispaError>`.
pub type Result<T> = std::result::Result<T, ChispaError>;
