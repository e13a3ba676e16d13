//! Generation client for palaver.
//!
//! A generation client turns one prompt into one completion. Calls are
//! stateless and single-turn: no conversation history is forwarded, no
//! retries are attempted, and every failure is reported as a
//! [`GenerationError`] for the caller to handle.

pub mod backend;
pub mod error;
pub mod gemini;
mod http;
pub mod openai;

pub use backend::{GenerationClient, GenerationConfig, Provider, build_client};
pub use error::GenerationError;
pub use gemini::GeminiClient;
pub use openai::OpenAiCompatibleClient;
