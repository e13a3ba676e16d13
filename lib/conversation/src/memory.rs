//! In-memory transcript store.
//!
//! Honors the same contract as the database-backed store: referential
//! checks, validation, conflict detection, and strictly increasing
//! timestamps in append order.

use crate::error::StoreError;
use crate::message::{Message, MessageRole, validate_append};
use crate::session::{Session, TranscriptStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use palaver_core::SessionId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, Session>,
    /// Kept in append order, which is also timestamp order.
    messages: Vec<Message>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Inner {
    /// Returns a timestamp later than every timestamp handed out before.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}

/// A transcript store held entirely in process memory.
#[derive(Default)]
pub struct InMemoryTranscriptStore {
    inner: Mutex<Inner>,
}

impl InMemoryTranscriptStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored messages across all sessions.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    /// Returns the number of stored sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn create_session(&self, id: SessionId) -> Result<Session, StoreError> {
        let mut inner = self.lock();
        if inner.sessions.contains_key(&id) {
            return Err(StoreError::SessionConflict { session_id: id });
        }
        let session = Session {
            id,
            created_at: Utc::now(),
        };
        inner.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn append_message(
        &self,
        session_id: SessionId,
        content: &str,
        role: MessageRole,
    ) -> Result<(), StoreError> {
        validate_append(content, role)?;

        let mut inner = self.lock();
        if !inner.sessions.contains_key(&session_id) {
            return Err(StoreError::SessionNotFound { session_id });
        }
        let timestamp = inner.next_timestamp();
        inner.messages.push(Message {
            session_id,
            content: content.to_string(),
            role,
            timestamp,
        });
        Ok(())
    }

    async fn history(&self, session_id: SessionId) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
