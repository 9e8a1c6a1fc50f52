//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FileLocalStore, FirebaseDocumentStore, MemoryDocumentStore, PgDocumentStore},
    config::{Config, StoreBackend},
    error::ApiError,
    web::{build_router, state::AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use studio_booking_core::ports::{DocumentStore, LocalStore};
use tracing::info;
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

    // --- 2. Connect the Document Store ---
    let store = connect_store(&config.store).await?;

    // --- 3. Build the Shared AppState ---
    let local: Arc<dyn LocalStore> = Arc::new(FileLocalStore::new(config.local_store_path.clone()));
    let app_state = Arc::new(AppState::start(config.clone(), store, local).await);

    // --- 4. Create the Web Router ---
    let app = build_router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_store(backend: &StoreBackend) -> Result<Arc<dyn DocumentStore>, ApiError> {
    match backend {
        StoreBackend::Memory { seed_path } => {
            let store = match seed_path {
                Some(path) => MemoryDocumentStore::from_file(path)
                    .await
                    .map_err(|e| ApiError::Internal(format!("Failed to load seed: {}", e)))?,
                None => {
                    info!("Using an empty in-memory store.");
                    MemoryDocumentStore::new()
                }
            };
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres { database_url } => {
            info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let store = PgDocumentStore::new(pool);
            info!("Running database migrations...");
            store.run_migrations().await?;
            info!("Database migrations complete.");
            Ok(Arc::new(store))
        }
        StoreBackend::Firebase { database_url, auth } => {
            info!("Using Firebase database at {}", database_url);
            let client = reqwest::Client::new();
            Ok(Arc::new(FirebaseDocumentStore::new(client, database_url, auth.clone())))
        }
    }
}
