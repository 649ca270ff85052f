//! Success envelopes. Every 2xx body is `{"success": true, "data": ...}`;
//! paginated listings carry `pagination` next to `data`.

use axum::http::StatusCode;
use axum::Json;
use deck_core::Page;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub page: Page<T>,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

pub fn paged<T: Serialize>(page: Page<T>) -> Json<PageResponse<T>> {
    Json(PageResponse {
        success: true,
        page,
    })
}
