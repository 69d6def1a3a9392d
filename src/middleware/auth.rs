//! Auth middleware: bearer-token extractor that resolves the session user.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::User;

/// Extractor: the verified session for the `Authorization: Bearer` token.
///
/// The resolved user is handed to the handler as a value; nothing is
/// stashed in request extensions.
#[derive(Clone, Debug)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                debug!(error = %e, "missing or invalid Authorization header");
                AppError::MissingToken
            })?;

        let token = bearer.token().to_string();
        let user = state.auth_service().verify_session(&token).await?;
        Ok(AuthSession { user, token })
    }
}
