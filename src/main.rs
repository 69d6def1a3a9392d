//! Entry point: load config, wire dependencies, and run the server.

use std::sync::Arc;

use authflow::config::Config;
use authflow::db::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
use authflow::{build_auth_service, create_app, AppState};
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn CredentialStore> = match &config.database_url {
        Some(url) => {
            let store = PgCredentialStore::connect(url).await?;
            store.migrate().await?;
            tracing::info!("using PostgreSQL credential store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    let auth_service =
        build_auth_service(&config, store).map_err(|e| anyhow::anyhow!("auth: {}", e))?;
    let state = AppState::new(auth_service);

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new().allow_origin(origin.parse::<HeaderValue>()?),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let app = create_app(state).layer(cors);

    tracing::info!(addr = %config.server_addr, ttl_secs = config.token_ttl.num_seconds(), "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
