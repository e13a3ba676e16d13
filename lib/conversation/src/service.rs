//! Conversation service: session creation, chat turns, and transcripts.
//!
//! A turn moves through `user appended -> generated (reply or fallback) ->
//! assistant appended`. The two appends are separate units of work: if the
//! assistant append fails, the user message stays persisted and the turn
//! reports a storage error.

use crate::error::ConversationError;
use crate::message::{Message, MessageRole};
use crate::session::{Session, TranscriptStore};
use palaver_ai::GenerationClient;
use palaver_core::SessionId;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Conversation service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Reply stored and returned when the completion call fails.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

fn default_fallback_reply() -> String {
    "Sorry, I'm having trouble responding right now.".to_string()
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            fallback_reply: default_fallback_reply(),
        }
    }
}

/// Outcome of a completed chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    /// The assistant text that was stored.
    pub content: String,
    /// True if `content` is the fallback reply.
    pub fallback: bool,
}

/// Orchestrates the transcript store and the generation client.
#[derive(Clone)]
pub struct ConversationService {
    store: Arc<dyn TranscriptStore>,
    generator: Arc<dyn GenerationClient>,
    config: ConversationConfig,
}

impl ConversationService {
    /// Creates a new service.
    pub fn new(
        store: Arc<dyn TranscriptStore>,
        generator: Arc<dyn GenerationClient>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    /// Mints a fresh session identifier and persists the session.
    #[instrument(skip_all)]
    pub async fn create_session(&self) -> Result<Session, ConversationError> {
        let session = self.store.create_session(SessionId::new()).await?;
        tracing::info!(session_id = %session.id, "Created session");
        Ok(session)
    }

    /// Runs one chat turn and returns the assistant reply.
    ///
    /// Only `user_text` is sent to the model; earlier messages of the
    /// session are not included in the prompt.
    ///
    /// # Errors
    ///
    /// - `InvalidMessage` / `SessionNotFound` if the user append is rejected;
    ///   nothing is written and no completion is requested.
    /// - `Storage` if either append fails. A failure of the assistant append
    ///   leaves the user message in place.
    #[instrument(skip_all, fields(session_id = %session_id))]
    pub async fn send_message(
        &self,
        session_id: SessionId,
        user_text: &str,
    ) -> Result<TurnReply, ConversationError> {
        self.store
            .append_message(session_id, user_text, MessageRole::User)
            .await?;

        let reply = match self.generator.complete(user_text).await {
            Ok(content) => TurnReply {
                content,
                fallback: false,
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = %self.generator.provider(),
                    model = self.generator.model(),
                    "Generation failed; using fallback reply"
                );
                TurnReply {
                    content: self.config.fallback_reply.clone(),
                    fallback: true,
                }
            }
        };

        if let Err(e) = self
            .store
            .append_message(session_id, &reply.content, MessageRole::Assistant)
            .await
        {
            tracing::error!(
                error = %e,
                "Assistant append failed; transcript holds an unanswered user message"
            );
            return Err(e.into());
        }

        Ok(reply)
    }

    /// Returns the session's messages in ascending timestamp order.
    #[instrument(skip_all, fields(session_id = %session_id))]
    pub async fn transcript(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<Message>, ConversationError> {
        Ok(self.store.history(session_id).await?)
    }

    /// Verifies the transcript store is reachable.
    pub async fn check_store(&self) -> Result<(), ConversationError> {
        Ok(self.store.ping().await?)
    }
}
