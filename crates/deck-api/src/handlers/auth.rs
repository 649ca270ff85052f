//! Handlers for `/api/auth`: account registration, login and token checks.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use deck_core::{AuthSession, Credentials, Identity, Registration, User};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::response::{created, ok, ApiResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/verify", get(verify))
}

#[derive(Debug, Serialize)]
pub struct TokenStatus {
    pub valid: bool,
    pub user: Identity,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<Registration>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthSession>>)> {
    Ok(created(state.accounts.register(input).await?))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<Credentials>,
) -> ApiResult<Json<ApiResponse<AuthSession>>> {
    Ok(ok(state.accounts.login(input).await?))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<ApiResponse<User>>> {
    Ok(ok(state.accounts.profile(identity.user_id).await?))
}

/// GET /api/auth/verify
///
/// Token validity only; the extractor has already rejected bad tokens.
pub async fn verify(AuthUser(identity): AuthUser) -> Json<ApiResponse<TokenStatus>> {
    ok(TokenStatus {
        valid: true,
        user: identity,
    })
}
