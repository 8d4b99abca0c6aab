mod config;
mod db;
mod errors;
mod ingest;
mod mapping;
mod models;
mod recompute;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::ingest::{ImportOrchestrator, ImportSettings, Owner};
use crate::recompute::AuditedRecompute;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Insights API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store: Arc<dyn Store> = Arc::new(PgStore::new(db));

    let settings = Arc::new(ImportSettings {
        batch_size: config.import_batch_size,
        source: config.import_source.clone(),
        ..ImportSettings::default()
    });
    info!(
        batch_size = settings.batch_size,
        owner = %config.default_username,
        "Import pipeline configured"
    );

    let importer = Arc::new(ImportOrchestrator::new(
        store.clone(),
        Arc::new(AuditedRecompute::new(store.clone())),
        Owner {
            username: config.default_username.clone(),
        },
        settings.clone(),
    ));

    // Build app state
    let state = AppState {
        store,
        importer,
        settings,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
