use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use lumina_core::AppError;
use lumina_storage::{mime, MediaKey};
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Download the original artifact for an image record.
#[utoipa::path(
    get,
    path = "/api/v0/images/{id}/download",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Raw image bytes"),
        (status = 404, description = "Image or artifact not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(image_id = %id, operation = "download_image"))]
pub async fn download_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .records
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    let key = MediaKey::parse(&record.original_key)
        .map_err(|e| AppError::Internal(format!("stored artifact key is invalid: {}", e)))?;

    // NotFound from the object store propagates as 404: the record exists
    // but its artifact is missing (an orphaned record).
    let data = state.objects.get(&key).await.map_err(AppError::from)?;

    let headers = [
        (
            header::CONTENT_TYPE,
            mime::content_type_for(&record.filename).to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", record.filename),
        ),
    ];

    Ok((headers, data))
}
