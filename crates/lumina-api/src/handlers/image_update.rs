use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use lumina_core::models::{ImageRecordUpdate, ImageResponse, UpdateImageRequest};
use lumina_core::AppError;
use lumina_services::urls;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Update an image's title, tags or groups.
///
/// Artifact keys are preserved; only the mutable metadata changes. The
/// request carries the version the client read, and a stale version is
/// rejected with a conflict so concurrent edits never silently overwrite
/// each other.
#[utoipa::path(
    put,
    path = "/api/v0/images/{id}",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Image updated", body = ImageResponse),
        (status = 400, description = "Invalid update (e.g. empty group set)", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 409, description = "Stale version", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(image_id = %id, operation = "update_image"))]
pub async fn update_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<UpdateImageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    body.validate().map_err(AppError::from)?;

    if let Some(ref group_ids) = body.group_ids {
        if group_ids.is_empty() {
            return Err(HttpAppError(AppError::GroupsRequired));
        }
    }

    let changes = ImageRecordUpdate {
        title: body.title,
        tag_ids: body.tag_ids,
        group_ids: body.group_ids,
    };

    let record = state.records.update(id, body.version, changes).await?;
    let response: ImageResponse = urls::image_response(&record, state.objects.as_ref())?;
    Ok(Json(response))
}
