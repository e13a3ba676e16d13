//! HTTP handlers for sessions, chat turns, history, and health.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use palaver_conversation::{Message, MessageRole};
use palaver_core::SessionId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

/// Response for `POST /api/session`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    session_id: String,
    message: String,
}

/// Response for `POST /api/chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// One transcript entry as returned by `GET /api/history/{session_id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for HistoryEntry {
    fn from(message: Message) -> Self {
        Self {
            content: message.content,
            role: message.role,
            timestamp: message.timestamp,
        }
    }
}

/// Response for `GET /api/history/{session_id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<HistoryEntry>,
}

/// Response for `GET /api/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Creates a new session.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.conversation.create_session().await?;
    Ok(Json(SessionResponse {
        session_id: session.id,
    }))
}

/// Runs one chat turn.
///
/// An identifier that does not parse cannot name a stored session, so it is
/// answered as not found without touching the store.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id =
        SessionId::from_str(&request.session_id).map_err(|_| ApiError::UnknownSession {
            session_id: request.session_id.clone(),
        })?;

    let reply = state
        .conversation
        .send_message(session_id, &request.message)
        .await?;

    Ok(Json(ChatResponse {
        response: reply.content,
    }))
}

/// Returns the session transcript in ascending timestamp order.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Ok(session_id) = SessionId::from_str(&session_id) else {
        return Ok(Json(HistoryResponse {
            messages: Vec::new(),
        }));
    };

    let messages = state.conversation.transcript(session_id).await?;
    Ok(Json(HistoryResponse {
        messages: messages.into_iter().map(HistoryEntry::from).collect(),
    }))
}

/// Reports whether the transcript store is reachable.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    match state.conversation.check_store().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}
