//! Error types for the server.
//!
//! `StartupError` covers everything that can stop the process before it
//! serves traffic. `ApiError` is what handlers return; it maps the
//! conversation error taxonomy onto HTTP statuses and keeps storage details
//! out of response bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use palaver_conversation::ConversationError;
use serde::Serialize;
use std::fmt;

/// Errors raised while bringing the server up.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded or is inconsistent.
    Config { details: String },
    /// The database pool could not be created.
    Database { details: String },
    /// Schema migrations failed.
    Migration { details: String },
    /// The generation client could not be built.
    Generation { details: String },
    /// The listener could not be bound.
    Bind { addr: String, details: String },
    /// The HTTP server stopped with an error.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "invalid configuration: {details}"),
            Self::Database { details } => write!(f, "failed to connect to database: {details}"),
            Self::Migration { details } => write!(f, "failed to run migrations: {details}"),
            Self::Generation { details } => {
                write!(f, "failed to build generation client: {details}")
            }
            Self::Bind { addr, details } => write!(f, "failed to bind {addr}: {details}"),
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Errors returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Error from the conversation service.
    Conversation(ConversationError),
    /// The path or body named a session id that cannot exist.
    UnknownSession { session_id: String },
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        Self::Conversation(err)
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error kind.
    pub error: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    /// Returns true if the request itself was at fault.
    fn is_client_error(&self) -> bool {
        match self {
            Self::Conversation(err) => err.is_client_error(),
            Self::UnknownSession { .. } => true,
        }
    }

    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::Conversation(ConversationError::InvalidMessage { reason }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "invalid_message",
                    message: reason.clone(),
                },
            ),
            Self::Conversation(ConversationError::SessionNotFound { session_id }) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "session_not_found",
                    message: format!("session '{session_id}' not found"),
                },
            ),
            Self::UnknownSession { session_id } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "session_not_found",
                    message: format!("session '{session_id}' not found"),
                },
            ),
            Self::Conversation(ConversationError::SessionConflict { .. }) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: "session_conflict",
                    message: "Session could not be created, please retry".to_string(),
                },
            ),
            Self::Conversation(ConversationError::Storage { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "storage_error",
                    message: "Internal server error".to_string(),
                },
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if self.is_client_error() {
            tracing::debug!(error = ?self, status = status.as_u16(), "Request rejected");
        } else {
            tracing::error!(error = ?self, status = status.as_u16(), "Request failed");
        }
        (status, Json(body)).into_response()
    }
}
