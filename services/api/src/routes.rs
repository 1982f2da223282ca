//! Proxy service routes

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::{AppState, error::ApiError, listing, upload};

/// Create the router for the proxy service
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/upload",
            post(upload::upload)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/media",
            get(listing::list_media).fallback(method_not_allowed),
        )
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "media-proxy"
    }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
