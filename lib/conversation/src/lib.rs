//! Conversation layer for palaver.
//!
//! This crate provides:
//!
//! - **Transcript Store**: durable sessions and their ordered messages
//! - **Conversation Service**: one chat turn = user append, one completion
//!   call, assistant append
//! - **In-memory store**: the store contract without a database

pub mod error;
pub mod memory;
pub mod message;
pub mod service;
pub mod session;

pub use error::{ConversationError, StoreError};
pub use memory::InMemoryTranscriptStore;
pub use message::{Message, MessageRole};
pub use service::{ConversationConfig, ConversationService, TurnReply};
pub use session::{Session, TranscriptStore};
