//! Router assembly.

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>, cors_allowed_origins: Option<&str>) -> Router {
    Router::new()
        .route("/api/session", post(routes::create_session))
        .route("/api/chat", post(routes::chat))
        .route("/api/history/{session_id}", get(routes::history))
        .route("/api/health", get(routes::health))
        .layer(cors_layer(cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive unless a comma-separated allow-list is configured.
fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let layer = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{ChatResponse, HealthResponse, HistoryResponse, SessionResponse};
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use palaver_ai::{GenerationClient, GenerationError, Provider};
    use palaver_conversation::{
        ConversationConfig, ConversationService, InMemoryTranscriptStore, Message, MessageRole,
        Session, StoreError, TranscriptStore,
    };
    use palaver_core::SessionId;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    struct Echo {
        fail: bool,
    }

    #[async_trait]
    impl GenerationClient for Echo {
        async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
            if self.fail {
                Err(GenerationError::Timeout)
            } else {
                Ok(format!("echo: {prompt}"))
            }
        }

        fn provider(&self) -> Provider {
            Provider::Gemini
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    struct Unreachable;

    #[async_trait]
    impl TranscriptStore for Unreachable {
        async fn create_session(&self, _id: SessionId) -> Result<Session, StoreError> {
            Err(StoreError::Storage {
                reason: "connection refused".to_string(),
            })
        }

        async fn append_message(
            &self,
            _session_id: SessionId,
            _content: &str,
            _role: MessageRole,
        ) -> Result<(), StoreError> {
            Err(StoreError::Storage {
                reason: "connection refused".to_string(),
            })
        }

        async fn history(&self, _session_id: SessionId) -> Result<Vec<Message>, StoreError> {
            Err(StoreError::Storage {
                reason: "connection refused".to_string(),
            })
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Storage {
                reason: "connection refused".to_string(),
            })
        }
    }

    fn app_with(store: Arc<dyn TranscriptStore>, fail: bool) -> Router {
        let service =
            ConversationService::new(store, Arc::new(Echo { fail }), ConversationConfig::default());
        router(Arc::new(AppState::new(service)), None)
    }

    fn app() -> Router {
        app_with(Arc::new(InMemoryTranscriptStore::new()), false)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn parse<T: DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).expect("response shape")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request")
    }

    async fn new_session(app: &Router) -> SessionId {
        let (status, body) = send(
            app,
            Request::post("/api/session")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        parse::<SessionResponse>(body).session_id
    }

    #[tokio::test]
    async fn chat_round_trip() {
        let app = app();
        let session_id = new_session(&app).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/chat",
                serde_json::json!({"session_id": session_id.to_string(), "message": "hello"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<ChatResponse>(body).response, "echo: hello");

        let (status, body) = send(&app, get(&format!("/api/history/{session_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let history: HistoryResponse = parse(body);
        assert_eq!(history.messages.len(), 2);
        assert_eq!(history.messages[0].content, "hello");
        assert_eq!(history.messages[0].role, MessageRole::User);
        assert_eq!(history.messages[1].content, "echo: hello");
        assert_eq!(history.messages[1].role, MessageRole::Assistant);
        assert!(history.messages[0].timestamp < history.messages[1].timestamp);
    }

    #[tokio::test]
    async fn generation_failure_returns_fallback() {
        let app = app_with(Arc::new(InMemoryTranscriptStore::new()), true);
        let session_id = new_session(&app).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/chat",
                serde_json::json!({"session_id": session_id.to_string(), "message": "hello"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            parse::<ChatResponse>(body).response,
            "Sorry, I'm having trouble responding right now."
        );
    }

    #[tokio::test]
    async fn empty_message_is_bad_request() {
        let app = app();
        let session_id = new_session(&app).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/chat",
                serde_json::json!({"session_id": session_id.to_string(), "message": "   "}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_message");
        assert!(body["message"].is_string());

        let (_, body) = send(&app, get(&format!("/api/history/{session_id}"))).await;
        assert!(parse::<HistoryResponse>(body).messages.is_empty());
    }

    #[tokio::test]
    async fn nul_in_message_is_bad_request() {
        let app = app();
        let session_id = new_session(&app).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/chat",
                serde_json::json!({"session_id": session_id.to_string(), "message": "hi\u{0}there"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_message");

        let (_, body) = send(&app, get(&format!("/api/history/{session_id}"))).await;
        assert!(parse::<HistoryResponse>(body).messages.is_empty());
    }

    #[tokio::test]
    async fn other_spellings_of_a_session_id_are_unknown() {
        let app = app();
        let session_id = new_session(&app).await;
        let canonical = session_id.to_string();

        for spelling in [format!("{{{canonical}}}"), canonical.to_uppercase()] {
            let (status, _) = send(
                &app,
                post_json(
                    "/api/chat",
                    serde_json::json!({"session_id": spelling, "message": "hello"}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        let (_, body) = send(&app, get(&format!("/api/history/{canonical}"))).await;
        assert!(parse::<HistoryResponse>(body).messages.is_empty());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let app = app();

        for session_id in [SessionId::new().to_string(), "not-a-uuid".to_string()] {
            let (status, body) = send(
                &app,
                post_json(
                    "/api/chat",
                    serde_json::json!({"session_id": session_id, "message": "hello"}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"], "session_not_found");
        }
    }

    #[tokio::test]
    async fn history_of_unknown_session_is_empty() {
        let app = app();

        for uri in [
            format!("/api/history/{}", SessionId::new()),
            "/api/history/not-a-uuid".to_string(),
        ] {
            let (status, body) = send(&app, get(&uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert!(parse::<HistoryResponse>(body).messages.is_empty());
        }
    }

    #[tokio::test]
    async fn storage_failure_is_internal_error() {
        let app = app_with(Arc::new(Unreachable), false);

        let (status, body) = send(
            &app,
            Request::post("/api/session")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "storage_error");
        assert!(
            !body["message"]
                .as_str()
                .unwrap_or_default()
                .contains("connection refused")
        );
    }

    #[tokio::test]
    async fn health_reflects_store() {
        let (status, body) = send(&app(), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<HealthResponse>(body).status, "ok");

        let (status, body) = send(&app_with(Arc::new(Unreachable), false), get("/api/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(parse::<HealthResponse>(body).status, "unavailable");
    }

    #[tokio::test]
    async fn cors_allow_list_is_honored() {
        let service = ConversationService::new(
            Arc::new(InMemoryTranscriptStore::new()),
            Arc::new(Echo { fail: false }),
            ConversationConfig::default(),
        );
        let app = router(
            Arc::new(AppState::new(service)),
            Some("http://localhost:3000, http://example.test"),
        );

        let response = app
            .oneshot(
                Request::get("/api/health")
                    .header(header::ORIGIN, "http://example.test")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://example.test")
        );
    }
}
