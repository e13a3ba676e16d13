//! Error types for the generation client.

use std::fmt;

/// Errors from a text-completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The client could not be built from its configuration.
    InvalidConfig { reason: String },
    /// The request never produced an HTTP response.
    RequestFailed { reason: String },
    /// The transport timeout elapsed before a response arrived.
    Timeout,
    /// The provider answered with a non-success status.
    Status { status: u16, body: String },
    /// The provider answered successfully but produced no usable text.
    EmptyResponse,
    /// The response body did not have the expected shape.
    ResponseParseFailed { reason: String },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => {
                write!(f, "invalid generation configuration: {reason}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "generation request failed: {reason}")
            }
            Self::Timeout => write!(f, "generation request timed out"),
            Self::Status { status, body } => {
                write!(f, "generation provider returned HTTP {status}: {body}")
            }
            Self::EmptyResponse => write!(f, "generation provider returned no text"),
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse generation response: {reason}")
            }
        }
    }
}

impl std::error::Error for GenerationError {}
