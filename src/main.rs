//! Rental Server
//!
//! REST API server for equipment rental tracking.

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;

use rental_server::{
    api,
    config::AppConfig,
    logging,
    models::{rental, timestamps::SystemClock, user_device_token},
    repository::Repository,
    schema::{EntityRegistry, PgTableStore, TableStore},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    let _log_guard = logging::init(&config.logging);

    tracing::info!("Starting Rental Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    // Register entities, provisioning their tables unless disabled, then
    // resolve cross-entity relations
    let pg_store = PgTableStore::new(pool.clone());
    let store = config
        .provisioning
        .enabled
        .then_some(&pg_store as &dyn TableStore);
    if store.is_none() {
        tracing::info!("Table provisioning disabled");
    }

    let mut registry = EntityRegistry::new();
    user_device_token::model(&mut registry, store).await?;
    rental::model(&mut registry, store).await?;
    let registry = registry.resolve()?;

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    let repository = Repository::new(pool);
    let services = Services::new(repository, &registry, Arc::new(SystemClock))?;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    let addr = SocketAddr::new(server_host.parse()?, server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
