use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use kinder_api::config::{config, StoreBackend};
use kinder_api::database::{DatabaseManager, DocumentStore, MemoryDocumentStore, PgDocumentStore};
use kinder_api::server;
use kinder_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    let config = config();
    tracing::info!("Starting Kinder API in {:?} mode", config.environment);

    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory document store; data is lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
        StoreBackend::Postgres => {
            DatabaseManager::migrate().await.context("failed to migrate document schema")?;
            let pool = DatabaseManager::pool().await.context("failed to open database pool")?;
            Arc::new(PgDocumentStore::new(pool))
        }
    };

    let state = AppState::from_config(store, config)?;
    if state.ai.is_none() {
        tracing::info!("AI_ENDPOINT not set; menu and letter generation are disabled");
    }
    let app = server::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Kinder API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
