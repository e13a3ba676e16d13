//! Shared HTTP plumbing for the hosted backends.

use crate::error::GenerationError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Builds a reqwest client whose every request is bounded by `timeout_seconds`.
pub(crate) fn build_http_client(timeout_seconds: u64) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| GenerationError::InvalidConfig {
            reason: format!("failed to build HTTP client: {e}"),
        })
}

/// Sends `body` as JSON and decodes a successful JSON response.
///
/// Exactly one attempt is made.
pub(crate) async fn post_json<B, R>(
    request: reqwest::RequestBuilder,
    body: &B,
) -> Result<R, GenerationError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request.json(body).send().await.map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GenerationError::Status {
            status: status.as_u16(),
            body: truncate_body(body),
        });
    }

    response.json::<R>().await.map_err(|e| {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::ResponseParseFailed {
                reason: e.to_string(),
            }
        }
    })
}

fn transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::RequestFailed {
            reason: e.to_string(),
        }
    }
}

/// Upper bound on the provider error body kept in [`GenerationError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

fn truncate_body(body: String) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body,
    }
}

/// Strips NUL characters and rejects blank completions; neither can be
/// stored as an assistant reply.
pub(crate) fn non_blank(text: Option<String>) -> Result<String, GenerationError> {
    let text = text.map(|t| t.replace('\0', ""));
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerationError::EmptyResponse),
    }
}
