use palaver_ai::build_client;
use palaver_conversation::{ConversationService, InMemoryTranscriptStore, TranscriptStore};
use palaver_server::{
    app,
    config::{ServerConfig, StorageBackend},
    db::{self, PgTranscriptStore},
    error::StartupError,
    state::AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(report) = run().await {
        tracing::error!(error = %report, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> palaver_core::Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    tracing::info!(storage = ?config.storage, "Loaded configuration");

    let store: Arc<dyn TranscriptStore> = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config.database_url.as_deref().unwrap_or_default();
            let pool = db::connect(
                database_url,
                config.db_pool_min,
                config.db_pool_max,
                Duration::from_secs(config.db_acquire_timeout_seconds),
            )
            .await?;
            db::migrate(&pool).await?;
            Arc::new(PgTranscriptStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory transcript store; transcripts are lost on restart");
            Arc::new(InMemoryTranscriptStore::new())
        }
    };

    let generator = build_client(&config.generation).map_err(|e| StartupError::Generation {
        details: e.to_string(),
    })?;
    tracing::info!(
        provider = %generator.provider(),
        model = generator.model(),
        "Generation client ready"
    );

    let conversation = ConversationService::new(store, generator, config.conversation);
    let state = Arc::new(AppState::new(conversation));
    let router = app::router(state, config.cors_allowed_origins.as_deref());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: config.bind_addr.clone(),
            details: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            details: e.to_string(),
        })?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
