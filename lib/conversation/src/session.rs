//! Sessions and the transcript store contract.

use crate::error::StoreError;
use crate::message::{Message, MessageRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use palaver_core::SessionId;
use serde::{Deserialize, Serialize};

/// A conversation session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

/// Trait for transcript storage.
///
/// Sessions are never updated or deleted. Each method is an independent
/// unit of work that acquires and releases its own resources.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Persists a new session under an identifier chosen by the caller.
    ///
    /// Fails with [`StoreError::SessionConflict`] rather than overwriting an
    /// existing session.
    async fn create_session(&self, id: SessionId) -> Result<Session, StoreError>;

    /// Appends one message; the store assigns its timestamp.
    ///
    /// Fails with [`StoreError::SessionNotFound`] for an unknown session and
    /// [`StoreError::InvalidMessage`] for empty content or a non-writable role.
    async fn append_message(
        &self,
        session_id: SessionId,
        content: &str,
        role: MessageRole,
    ) -> Result<(), StoreError>;

    /// Returns every message of the session in ascending timestamp order,
    /// ties resolved by append order.
    ///
    /// An unknown session yields an empty list, not an error.
    async fn history(&self, session_id: SessionId) -> Result<Vec<Message>, StoreError>;

    /// Verifies the backing store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
