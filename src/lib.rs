//! Email/password authentication service with stateless JWT sessions.
//!
//! Provides user registration, credential verification, and session-token
//! issuance/validation over a pluggable credential store.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::AuthService;

use std::sync::Arc;

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

use auth::{PasswordHasher, TokenIssuer, TokenVerifier};
use db::CredentialStore;
use error::AppResult;

/// Build the API router (health, auth). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let auth_routes = axum::Router::new()
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .route("/verify", get(auth::verify));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/api/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire the auth service from configuration and a credential store.
pub fn build_auth_service(
    config: &Config,
    store: Arc<dyn CredentialStore>,
) -> AppResult<AuthService> {
    let hasher = PasswordHasher::new(config.hash_cost)?;
    let issuer = TokenIssuer::new(&config.jwt_secret, config.token_ttl);
    let verifier = TokenVerifier::new(&config.jwt_secret);
    Ok(AuthService::new(store, hasher, issuer, verifier))
}
