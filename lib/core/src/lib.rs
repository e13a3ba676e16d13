//! Core types shared by every palaver crate.
//!
//! This crate provides the session identifier and the rootcause-based
//! `Result` alias used at the outer layers of the chat backend.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, SessionId};
