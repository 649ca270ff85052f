//! Handlers for `/api/clients`. Every route requires an authenticated user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use deck_core::{Client, ClientPatch, ClientQuery, ClientStats, NewClient};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::AuthUser;
use crate::response::{created, ok, paged, ApiResponse, PageResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/search", get(search))
        .route("/stats", get(stats))
        .route("/{id}", get(get_one).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/clients
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<ClientQuery>,
) -> ApiResult<Json<PageResponse<Client>>> {
    Ok(paged(state.clients.list(&query).await?))
}

/// GET /api/clients/search?q=
pub async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Client>>>> {
    Ok(ok(state.clients.search(&query.q).await?))
}

/// GET /api/clients/stats
pub async fn stats(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<ApiResponse<ClientStats>>> {
    Ok(ok(state.clients.stats(Utc::now()).await?))
}

/// GET /api/clients/{id}
pub async fn get_one(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Client>>> {
    Ok(ok(state.clients.get(id).await?))
}

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiJson(input): ApiJson<NewClient>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Client>>)> {
    Ok(created(state.clients.create(input).await?))
}

/// PUT /api/clients/{id}
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ClientPatch>,
) -> ApiResult<Json<ApiResponse<Client>>> {
    Ok(ok(state.clients.update(id, patch).await?))
}

/// DELETE /api/clients/{id}
pub async fn remove(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    state.clients.delete(id).await?;
    Ok(ok(json!({ "id": id })))
}
