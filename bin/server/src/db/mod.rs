//! Database access for the palaver server.
//!
//! This module provides:
//! - Connection pool setup and schema migrations
//! - The PostgreSQL transcript store

pub mod transcript;

pub use transcript::PgTranscriptStore;

use crate::error::StartupError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Opens a connection pool and verifies it can reach the database.
///
/// # Errors
///
/// Returns [`StartupError::Database`] if no connection can be established.
pub async fn connect(
    database_url: &str,
    min_connections: u32,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, StartupError> {
    PgPoolOptions::new()
        .min_connections(min_connections)
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
        .map_err(|e| StartupError::Database {
            details: e.to_string(),
        })
}

/// Brings the schema up to date.
///
/// # Errors
///
/// Returns [`StartupError::Migration`] if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), StartupError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StartupError::Migration {
            details: e.to_string(),
        })
}
