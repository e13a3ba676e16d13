//! OpenAI-compatible chat completions backend.
//!
//! Works with OpenAI itself and with self-hosted servers that speak the
//! same protocol (Ollama, vLLM, llama.cpp server).

use crate::backend::{GenerationClient, GenerationConfig, Provider};
use crate::error::GenerationError;
use crate::http::{build_http_client, non_blank, post_json};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Client for `POST /v1/chat/completions`.
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiCompatibleClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] if no base URL is configured.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| GenerationError::InvalidConfig {
                reason: "openai_compatible requires a base URL".to_string(),
            })?;

        Ok(Self {
            http: build_http_client(config.timeout_seconds)?,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key: config.api_key().map(str::to_string),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl GenerationClient for OpenAiCompatibleClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut request = self.http.post(&self.endpoint);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        let response: ChatCompletionResponse =
            post_json(request, &self.request_body(prompt)).await?;
        response.into_text()
    }

    fn provider(&self) -> Provider {
        Provider::OpenAiCompatible
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_text(self) -> Result<String, GenerationError> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        non_blank(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_base_url() {
        let mut config = GenerationConfig::openai_compatible("", "gpt-4o-mini");
        assert!(matches!(
            OpenAiCompatibleClient::new(&config),
            Err(GenerationError::InvalidConfig { .. })
        ));
        config.base_url = None;
        assert!(OpenAiCompatibleClient::new(&config).is_err());
    }

    #[test]
    fn request_body_has_only_the_prompt() {
        let client = OpenAiCompatibleClient::new(&GenerationConfig::openai_compatible(
            "http://localhost:11434/",
            "llama3",
        ))
        .expect("client");
        assert_eq!(client.endpoint, "http://localhost:11434/v1/chat/completions");

        let body = serde_json::to_value(client.request_body("hello")).expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({
                "model": "llama3",
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn response_text_from_first_choice() {
        let response: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi there"}}]
        }))
        .expect("deserialize");
        assert_eq!(response.into_text(), Ok("Hi there".to_string()));
    }

    #[test]
    fn null_content_is_empty_response() {
        let response: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .expect("deserialize");
        assert_eq!(response.into_text(), Err(GenerationError::EmptyResponse));
    }
}
