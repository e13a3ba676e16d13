//! palaver HTTP chat backend.
//!
//! This crate wires the conversation service to a transcript store and a
//! generation client and exposes it over a small JSON API.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
