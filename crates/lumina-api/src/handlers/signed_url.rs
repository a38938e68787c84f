use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use lumina_core::models::SignedUrlResponse;
use lumina_core::AppError;
use lumina_services::urls;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// S3 rejects presign lifetimes beyond seven days.
const MAX_SIGNED_URL_TTL_SECS: u64 = 7 * 24 * 3600;

#[derive(Debug, Deserialize)]
pub struct SignedUrlQuery {
    pub ttl_secs: Option<u64>,
}

/// Issue a time-boxed signed URL for an image's original artifact.
///
/// Internal/admin retrieval path: the URL is generated per request and never
/// persisted.
#[utoipa::path(
    get,
    path = "/api/v0/images/{id}/signed-url",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID"),
        ("ttl_secs" = Option<u64>, Query, description = "URL lifetime in seconds (default 3600)")
    ),
    responses(
        (status = 200, description = "Signed URL issued", body = SignedUrlResponse),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(image_id = %id, operation = "signed_url"))]
pub async fn signed_url(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<SignedUrlQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .records
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    let ttl_secs = query
        .ttl_secs
        .unwrap_or(state.config.signed_url_ttl.as_secs())
        .min(MAX_SIGNED_URL_TTL_SECS);

    let response =
        urls::signed_original_url(&record, state.objects.as_ref(), Duration::from_secs(ttl_secs))
            .await?;
    Ok(Json(response))
}
