//! Error types for the conversation crate.
//!
//! - `StoreError`: errors from transcript store operations
//! - `ConversationError`: errors surfaced by the conversation service
//!
//! Generation failures never appear here; the service replaces them with
//! the fallback reply.

use palaver_core::SessionId;
use std::fmt;

/// Errors from transcript store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Message content or role was rejected.
    InvalidMessage { reason: String },
    /// The referenced session does not exist.
    SessionNotFound { session_id: SessionId },
    /// A session with this identifier already exists.
    SessionConflict { session_id: SessionId },
    /// The backing store failed or was unreachable.
    Storage { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMessage { reason } => write!(f, "invalid message: {reason}"),
            Self::SessionNotFound { session_id } => {
                write!(f, "session not found: {session_id}")
            }
            Self::SessionConflict { session_id } => {
                write!(f, "session already exists: {session_id}")
            }
            Self::Storage { reason } => write!(f, "transcript storage failed: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from conversation service operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// The caller's input was malformed or empty.
    InvalidMessage { reason: String },
    /// The operation referenced a session that does not exist.
    SessionNotFound { session_id: SessionId },
    /// A freshly minted session identifier collided with an existing one.
    SessionConflict { session_id: SessionId },
    /// Persistence failed.
    Storage { reason: String },
}

impl ConversationError {
    /// Returns true if the error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMessage { .. } | Self::SessionNotFound { .. }
        )
    }
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMessage { reason } => write!(f, "invalid message: {reason}"),
            Self::SessionNotFound { session_id } => {
                write!(f, "session not found: {session_id}")
            }
            Self::SessionConflict { session_id } => {
                write!(f, "session id collision: {session_id}")
            }
            Self::Storage { reason } => write!(f, "storage error: {reason}"),
        }
    }
}

impl std::error::Error for ConversationError {}

impl From<StoreError> for ConversationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidMessage { reason } => Self::InvalidMessage { reason },
            StoreError::SessionNotFound { session_id } => Self::SessionNotFound { session_id },
            StoreError::SessionConflict { session_id } => Self::SessionConflict { session_id },
            StoreError::Storage { reason } => Self::Storage { reason },
        }
    }
}
