//! PostgreSQL transcript store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use palaver_conversation::message::validate_append;
use palaver_conversation::{Message, MessageRole, Session, StoreError, TranscriptStore};
use palaver_core::SessionId;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

/// Row type for message queries.
#[derive(FromRow)]
struct MessageRow {
    session_id: String,
    content: String,
    role: String,
    timestamp: DateTime<Utc>,
}

impl MessageRow {
    fn try_into_message(self) -> Result<Message, sqlx::Error> {
        let session_id = SessionId::from_str(&self.session_id).map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid session id '{}': {}", self.session_id, e),
            )))
        })?;
        let role = MessageRole::from_str(&self.role).map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            )))
        })?;
        Ok(Message {
            session_id,
            content: self.content,
            role,
            timestamp: self.timestamp,
        })
    }
}

/// Maps a driver error onto the store taxonomy.
fn classify(err: sqlx::Error, session_id: SessionId) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return StoreError::SessionNotFound { session_id };
        }
        if db_err.is_unique_violation() {
            return StoreError::SessionConflict { session_id };
        }
        if db_err.is_check_violation() {
            return StoreError::InvalidMessage {
                reason: db_err.message().to_string(),
            };
        }
    }
    StoreError::Storage {
        reason: err.to_string(),
    }
}

/// Transcript store backed by the `sessions` and `messages` tables.
///
/// Every call checks a connection out of the pool and returns it when the
/// statement completes, including on error.
#[derive(Clone)]
pub struct PgTranscriptStore {
    pool: PgPool,
}

impl PgTranscriptStore {
    /// Creates a new store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranscriptStore for PgTranscriptStore {
    async fn create_session(&self, id: SessionId) -> Result<Session, StoreError> {
        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO sessions (session_id)
            VALUES ($1)
            RETURNING created_at
            "#,
        )
        .bind(id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, id))?;

        Ok(Session { id, created_at })
    }

    async fn append_message(
        &self,
        session_id: SessionId,
        content: &str,
        role: MessageRole,
    ) -> Result<(), StoreError> {
        validate_append(content, role)?;

        sqlx::query(
            r#"
            INSERT INTO messages (session_id, content, role, "timestamp")
            VALUES ($1, $2, $3, clock_timestamp())
            "#,
        )
        .bind(session_id.to_string())
        .bind(content)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, session_id))?;

        Ok(())
    }

    async fn history(&self, session_id: SessionId) -> Result<Vec<Message>, StoreError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT session_id, content, role, "timestamp"
            FROM messages
            WHERE session_id = $1
            ORDER BY "timestamp" ASC, id ASC
            "#,
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify(e, session_id))?;

        rows.into_iter()
            .map(|row| row.try_into_message().map_err(|e| classify(e, session_id)))
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
