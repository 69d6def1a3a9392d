//! Auth HTTP handlers: signup, signin, verify.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::{AppError, FieldError};
use crate::handlers::http::AppState;
use crate::middleware::auth::AuthSession;
use crate::models::User;
use crate::services::auth::{AuthOutcome, LoginInput, RegisterInput};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

impl AuthResponse {
    fn success(message: &'static str, outcome: AuthOutcome) -> Self {
        Self {
            status: "success",
            message,
            token: outcome.token,
            user: outcome.user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub valid: bool,
    pub token: String,
    pub user: User,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::Validation(vec![FieldError::new("body", e.body_text())]))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let outcome = state.auth_service().register(body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::success("User registered successfully", outcome)),
    ))
}

/// POST /api/auth/signin
pub async fn signin(
    State(state): State<AppState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let outcome = state.auth_service().authenticate(body(payload)?).await?;
    Ok(Json(AuthResponse::success("Login successful", outcome)))
}

/// GET /api/auth/verify
pub async fn verify(session: AuthSession) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        status: "success",
        message: "Token is valid",
        valid: true,
        token: session.token,
        user: session.user,
    })
}
