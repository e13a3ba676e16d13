//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys
//! use `__` as separator, e.g. `GENERATION__API_KEY`.
//!
//! See [`GenerationConfig`] for the completion provider settings and
//! [`ConversationConfig`] for the fallback reply.

use crate::error::StartupError;
use palaver_ai::GenerationConfig;
use palaver_conversation::ConversationConfig;
use serde::Deserialize;

/// Which transcript store backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL via `database_url`.
    #[default]
    Postgres,
    /// Process memory; transcripts are lost on restart.
    Memory,
}

/// Server configuration composed from library configs.
#[derive(Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Transcript store backend.
    #[serde(default)]
    pub storage: StorageBackend,

    /// PostgreSQL database connection URL. Required for the postgres backend.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Connections kept open in the pool.
    #[serde(default = "default_db_pool_min")]
    pub db_pool_min: u32,

    /// Upper bound on pooled connections.
    #[serde(default = "default_db_pool_max")]
    pub db_pool_max: u32,

    /// How long a store call waits for a pooled connection.
    #[serde(default = "default_db_acquire_timeout_seconds")]
    pub db_acquire_timeout_seconds: u64,

    /// Comma-separated CORS allow-list. Unset allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Completion provider configuration.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Conversation service configuration.
    #[serde(default)]
    pub conversation: ConversationConfig,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5001".to_string()
}

fn default_db_pool_min() -> u32 {
    1
}

fn default_db_pool_max() -> u32 {
    10
}

fn default_db_acquire_timeout_seconds() -> u64 {
    30
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, StartupError> {
        let config: Self = config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| StartupError::Config {
                details: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints serde cannot express.
    fn validate(&self) -> Result<(), StartupError> {
        if self.storage == StorageBackend::Postgres
            && self
                .database_url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
        {
            return Err(StartupError::Config {
                details: "DATABASE_URL is required when STORAGE=postgres".to_string(),
            });
        }
        if self.db_pool_max == 0 || self.db_pool_min > self.db_pool_max {
            return Err(StartupError::Config {
                details: format!(
                    "invalid pool bounds: min {} max {}",
                    self.db_pool_min, self.db_pool_max
                ),
            });
        }
        Ok(())
    }
}
