//! Error types for sessions.

use thiserror::Error;

/// Session-specific errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session data could not be encoded or decoded.
    #[error("session data error: {0}")]
    Json(#[from] serde_json::Error),

    /// Session not found in the store.
    #[error("session not found")]
    SessionNotFound,

    /// Session has expired.
    #[error("session expired")]
    Expired,

    /// A thread panicked while holding the session lock.
    #[error("session lock poisoned")]
    Poisoned,
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
