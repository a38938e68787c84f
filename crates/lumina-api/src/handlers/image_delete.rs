use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Delete an image.
///
/// Artifact deletes are best-effort; removal of the metadata record is
/// authoritative. A failure removing either artifact is logged and
/// tolerated, a failure removing the record fails the request.
#[utoipa::path(
    delete,
    path = "/api/v0/images/{id}",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Metadata deletion failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(image_id = %id, operation = "delete_image"))]
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.deletions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
