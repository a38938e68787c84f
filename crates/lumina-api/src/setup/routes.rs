//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Slack on top of the upload size cap so oversized payloads reach the
/// validation gate (which reports `TOO_LARGE`) instead of being cut off by
/// the framework with an opaque rejection.
const UPLOAD_BODY_MARGIN_BYTES: usize = 2 * 1024 * 1024;

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi_spec() -> impl IntoResponse {
    Json(crate::api_doc::openapi_spec())
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes + UPLOAD_BODY_MARGIN_BYTES;

    Router::new()
        .route(
            "/api/v0/images",
            post(handlers::image_upload::upload_image).get(handlers::image_get::list_images),
        )
        .route(
            "/api/v0/images/{id}",
            get(handlers::image_get::get_image)
                .put(handlers::image_update::update_image)
                .delete(handlers::image_delete::delete_image),
        )
        .route(
            "/api/v0/images/{id}/download",
            get(handlers::image_download::download_image),
        )
        .route(
            "/api/v0/images/{id}/signed-url",
            get(handlers::signed_url::signed_url),
        )
        .route("/api/v0/openapi.json", get(openapi_spec))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
