//! # deck-api
//!
//! The HTTP layer for deckshare. Translates requests into calls on the
//! `deck-core` services and maps their results back onto JSON envelopes.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod state;

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Settings the router needs beyond the service graph.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub cors_origin: HeaderValue,
    /// Base64 slide payloads are large; this bounds every request body.
    pub max_body_bytes: usize,
    /// Directory served read-only under `/uploads`.
    pub upload_dir: PathBuf,
}

/// Builds the full application router with its middleware stack.
///
/// Layers apply bottom-up: CORS, request id, tracing, request-id
/// propagation, compression, body limit.
pub fn build_router(state: AppState, config: &RouterConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(handlers::health::routes())
        .nest("/api", api_routes())
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(middleware::cors_layer(config.cors_origin.clone()))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", handlers::auth::routes())
        .nest("/presentations", handlers::presentations::routes())
        .nest("/clients", handlers::clients::routes())
        .nest("/upload", handlers::upload::routes())
}
