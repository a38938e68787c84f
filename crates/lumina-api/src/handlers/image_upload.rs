use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use lumina_core::models::ImageResponse;
use lumina_services::urls;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::decode_upload;

/// Upload image handler
///
/// Decodes the multipart form into a fixed upload request, runs the upload
/// saga (validation, thumbnail derivation, dual artifact store, record
/// creation with compensation) and returns the created record with public
/// URLs substituted for the raw storage keys.
#[utoipa::path(
    post,
    path = "/api/v0/images",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded successfully", body = ImageResponse),
        (status = 400, description = "Invalid upload request", body = ErrorResponse),
        (status = 401, description = "Missing user identity", body = ErrorResponse),
        (status = 500, description = "Pipeline or storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, operation = "upload_image")
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let request = decode_upload(multipart, user.user_id).await?;
    let record = state.uploads.upload(request).await?;
    let response = urls::image_response(&record, state.objects.as_ref())?;
    Ok((StatusCode::CREATED, Json(response)))
}
