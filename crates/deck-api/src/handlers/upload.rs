//! Handlers for `/api/upload`: direct image uploads outside a presentation.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::info;

use deck_core::{AppError, StoredImage};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

pub const DEFAULT_FOLDER: &str = "uploads";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/base64", post(upload_one))
        .route("/base64/multiple", post(upload_many))
        .route("/file", post(upload_file))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub image: String,
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderedImage {
    pub base64: String,
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct MultiUploadRequest {
    pub images: Vec<OrderedImage>,
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderedUpload {
    pub order: i32,
    #[serde(flatten)]
    pub image: StoredImage,
}

/// POST /api/upload/base64
pub async fn upload_one(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<UploadRequest>,
) -> ApiResult<Json<ApiResponse<StoredImage>>> {
    if input.image.is_empty() {
        return Err(AppError::ValidationError("image is required".into()).into());
    }
    let folder = input.folder.as_deref().unwrap_or(DEFAULT_FOLDER);
    let stored = state.images.store(&input.image, folder).await?;
    info!(user_id = %user.user_id, asset_id = %stored.asset_id, "image uploaded");
    Ok(ok(stored))
}

/// POST /api/upload/base64/multiple
///
/// Uploads run concurrently; the response is sorted by `order` no matter
/// which upload finished first. On any failure the successful uploads of
/// this request are removed again.
pub async fn upload_many(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(input): ApiJson<MultiUploadRequest>,
) -> ApiResult<Json<ApiResponse<Vec<OrderedUpload>>>> {
    if input.images.is_empty() {
        return Err(AppError::ValidationError("at least one image is required".into()).into());
    }
    let folder = input.folder.as_deref().unwrap_or(DEFAULT_FOLDER);
    let images = &state.images;

    let results = join_all(input.images.iter().map(|img| async move {
        images.store(&img.base64, folder).await.map(|image| OrderedUpload {
            order: img.order,
            image,
        })
    }))
    .await;

    let (stored, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let mut stored: Vec<OrderedUpload> = stored.into_iter().flatten().collect();
    if let Some(Err(err)) = failed.into_iter().next() {
        let orphans: Vec<String> = stored.iter().map(|u| u.image.asset_id.clone()).collect();
        images.delete_many(&orphans).await;
        return Err(err.into());
    }

    stored.sort_by_key(|u| u.order);
    info!(user_id = %user.user_id, count = stored.len(), "images uploaded");
    Ok(ok(stored))
}

/// POST /api/upload/file
///
/// Multipart form with a required `file` field and an optional `folder`
/// field. The bytes are stored as png whatever the file name says.
pub async fn upload_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ApiResponse<StoredImage>>> {
    let mut multipart = multipart.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let mut file: Option<Vec<u8>> = None;
    let mut folder: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::ValidationError(e.body_text()))?;
                file = Some(data.to_vec());
            }
            "folder" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::ValidationError(e.body_text()))?;
                folder = Some(text);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::ValidationError("a file is required".into()))?;
    let folder = folder
        .as_deref()
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FOLDER);
    let stored = state.images.store_bytes(file, folder).await?;
    info!(user_id = %user.user_id, asset_id = %stored.asset_id, "file uploaded");
    Ok(ok(stored))
}
