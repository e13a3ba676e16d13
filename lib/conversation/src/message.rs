//! Message types for conversations.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use palaver_core::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User/human message.
    User,
    /// Assistant reply.
    Assistant,
    /// Legacy spelling of an assistant reply. Readable, never written.
    Ai,
}

impl MessageRole {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Ai => "ai",
        }
    }

    /// Returns true if new messages may be appended with this role.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "ai" => Ok(Self::Ai),
            other => Err(StoreError::InvalidMessage {
                reason: format!("unknown role '{other}'"),
            }),
        }
    }
}

/// A persisted message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The session this message belongs to.
    pub session_id: SessionId,
    /// Message content.
    pub content: String,
    /// Message role.
    pub role: MessageRole,
    /// When the store accepted the message. Sole ordering key.
    pub timestamp: DateTime<Utc>,
}

/// Checks a message before it is appended.
///
/// Every store implementation calls this so the rules are identical
/// regardless of backend.
///
/// # Errors
///
/// Returns [`StoreError::InvalidMessage`] for blank content, content
/// containing NUL (which PostgreSQL text cannot hold), or a non-writable role.
pub fn validate_append(content: &str, role: MessageRole) -> Result<(), StoreError> {
    if !role.is_writable() {
        return Err(StoreError::InvalidMessage {
            reason: format!("role '{role}' cannot be written"),
        });
    }
    if content.trim().is_empty() {
        return Err(StoreError::InvalidMessage {
            reason: "content must not be empty".to_string(),
        });
    }
    if content.contains('\0') {
        return Err(StoreError::InvalidMessage {
            reason: "content must not contain NUL characters".to_string(),
        });
    }
    Ok(())
}
