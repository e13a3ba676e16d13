//! Generation backend abstraction.
//!
//! Provides a unified interface over the hosted completion providers.

use crate::error::GenerationError;
use crate::gemini::GeminiClient;
use crate::openai::OpenAiCompatibleClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Available completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// Any API speaking the OpenAI chat completions protocol.
    OpenAiCompatible,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAiCompatible => write!(f, "openai_compatible"),
        }
    }
}

/// Configuration for a generation client.
///
/// Fields with defaults can be omitted when loading from environment variables.
/// The API key never has a default.
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// The provider type.
    #[serde(default = "default_provider")]
    pub provider: Provider,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key (required by Gemini, optional for OpenAI-compatible servers).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL for the API. Gemini falls back to the public endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Transport timeout for one completion call.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Temperature for sampling (0.0 - 1.0).
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_provider() -> Provider {
    Provider::Gemini
}

fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            timeout_seconds: default_timeout_seconds(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl GenerationConfig {
    /// Creates a Gemini configuration.
    #[must_use]
    pub fn gemini(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: Provider::Gemini,
            model: model.into(),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Creates a configuration for an OpenAI-compatible server.
    #[must_use]
    pub fn openai_compatible(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: Provider::OpenAiCompatible,
            model: model.into(),
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Returns the API key when one is configured and non-blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Trait for text-completion backends.
///
/// Each call is an independent single-turn completion.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Sends `prompt` to the provider and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails, times out, or yields no usable text.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Returns the provider type.
    fn provider(&self) -> Provider;

    /// Returns the model name.
    fn model(&self) -> &str;
}

/// Builds the client selected by `config.provider`.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidConfig`] when the provider's required
/// settings are missing or the HTTP client cannot be built.
pub fn build_client(
    config: &GenerationConfig,
) -> Result<Arc<dyn GenerationClient>, GenerationError> {
    let client: Arc<dyn GenerationClient> = match config.provider {
        Provider::Gemini => Arc::new(GeminiClient::new(config)?),
        Provider::OpenAiCompatible => Arc::new(OpenAiCompatibleClient::new(config)?),
    };
    tracing::debug!(
        provider = %client.provider(),
        model = client.model(),
        "Built generation client"
    );
    Ok(client)
}
