//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{CloudinaryAdapter, DbAdapter, DocumentStore, JwtTokenService},
    config::Config,
    error::ApiError,
    web::{router, state::AppState},
};
use neural_impulse_core::ports::{DatabaseService, MediaStore, TokenService};
use neural_impulse_core::MemoryStore;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Document Store & Run Migrations ---
    let mut document_store = None;
    let db: Arc<dyn DatabaseService> = if config.uses_memory_store() {
        warn!("DATABASE_URL is memory://, data will not survive a restart");
        Arc::new(MemoryStore::default())
    } else {
        let store = Arc::new(DocumentStore::new(config.database_url.clone(), 5));
        let db_adapter = DbAdapter::new(store.clone());
        info!("Running database migrations...");
        db_adapter.run_migrations().await?;
        info!("Database migrations complete.");
        document_store = Some(store);
        Arc::new(db_adapter)
    };

    // --- 3. Initialize Service Adapters ---
    let media: Arc<dyn MediaStore> = Arc::new(CloudinaryAdapter::new(
        reqwest::Client::new(),
        config.media.clone(),
    ));
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(&config.jwt_secret));

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(db, media, tokens, config.clone()));
    let app = router(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = document_store {
        store.shutdown().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
