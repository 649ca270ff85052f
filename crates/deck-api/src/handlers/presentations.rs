//! Handlers for `/api/presentations`: owner lifecycle plus anonymous
//! access by share id.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use deck_core::{
    AccessInfo, AppError, CreatedPresentation, NewPresentation, NewSlides, Presentation,
    PresentationPatch, PresentationSummary, PublicPresentation, ShareLink, SlidesAppended,
    UpdatedPresentation,
};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthUser;
use crate::response::{created, ok, ApiResponse};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/my", get(list_mine))
        .route("/access/{share_id}", get(check_access))
        .route("/view/{share_id}", post(view))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .route("/{id}/slides", post(add_slides))
        .route("/{id}/regenerate-link", post(regenerate_link))
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/presentations
pub async fn create(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ApiJson(input): ApiJson<NewPresentation>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreatedPresentation>>)> {
    let presentation = state.presentations.create(input, &owner).await?;
    Ok(created(CreatedPresentation::from(&presentation)))
}

/// GET /api/presentations/my
pub async fn list_mine(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<PresentationSummary>>>> {
    Ok(ok(state.presentations.list_for_owner(owner.user_id).await?))
}

/// GET /api/presentations/access/{share_id}
pub async fn check_access(
    State(state): State<AppState>,
    ApiPath(share_id): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<AccessInfo>>> {
    Ok(ok(state.access.check_access(&share_id).await?))
}

/// POST /api/presentations/view/{share_id}
///
/// The body is optional; an empty body means no password was offered.
pub async fn view(
    State(state): State<AppState>,
    ApiPath(share_id): ApiPath<String>,
    body: Bytes,
) -> ApiResult<Json<ApiResponse<PublicPresentation>>> {
    let request: ViewRequest = if body.is_empty() {
        ViewRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::ValidationError(format!("invalid request body: {e}")))?
    };
    let presentation = state
        .access
        .view(&share_id, request.password.as_deref())
        .await?;
    Ok(ok(presentation))
}

/// GET /api/presentations/{id}
pub async fn get_one(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Presentation>>> {
    Ok(ok(state.presentations.get_owned(id, owner.user_id).await?))
}

/// PUT /api/presentations/{id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<PresentationPatch>,
) -> ApiResult<Json<ApiResponse<UpdatedPresentation>>> {
    let presentation = state.presentations.update(id, patch, owner.user_id).await?;
    Ok(ok(UpdatedPresentation::from(&presentation)))
}

/// POST /api/presentations/{id}/slides
pub async fn add_slides(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewSlides>,
) -> ApiResult<Json<ApiResponse<SlidesAppended>>> {
    let presentation = state
        .presentations
        .add_slides(id, input, owner.user_id)
        .await?;
    Ok(ok(SlidesAppended {
        id: presentation.id,
        slide_count: presentation.slides.len(),
    }))
}

/// POST /api/presentations/{id}/regenerate-link
pub async fn regenerate_link(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<ShareLink>>> {
    let presentation = state
        .presentations
        .regenerate_share_link(id, owner.user_id)
        .await?;
    Ok(ok(ShareLink::from(&presentation)))
}

/// DELETE /api/presentations/{id}
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    state.presentations.delete(id, owner.user_id).await?;
    Ok(ok(json!({ "id": id })))
}
