use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use lumina_core::models::{ImageRecord, ImageResponse, ListOrder, Pagination};
use lumina_core::AppError;
use lumina_services::urls;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

/// Fetch a single image record by id.
#[utoipa::path(
    get,
    path = "/api/v0/images/{id}",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image found", body = ImageResponse),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(image_id = %id, operation = "get_image"))]
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .records
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;
    let response = urls::image_response(&record, state.objects.as_ref())?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ListImagesQuery {
    /// List everything visible to one group.
    pub group_id: Option<String>,
    /// List everything carrying one tag.
    pub tag_id: Option<String>,
    /// Tag filter for the user-scoped listing.
    pub tag: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order: Option<ListOrder>,
}

/// List images.
///
/// `group_id` and `tag_id` select the group/tag listings; with neither, the
/// result is the caller's own images, paginated and optionally filtered by
/// `tag`.
#[utoipa::path(
    get,
    path = "/api/v0/images",
    tag = "images",
    params(
        ("group_id" = Option<String>, Query, description = "List images visible to a group"),
        ("tag_id" = Option<String>, Query, description = "List images carrying a tag"),
        ("tag" = Option<String>, Query, description = "Tag filter for the user-scoped listing"),
        ("limit" = Option<i64>, Query, description = "Page size (user-scoped listing)"),
        ("offset" = Option<i64>, Query, description = "Page offset (user-scoped listing)"),
        ("order" = Option<String>, Query, description = "Sort order: asc or desc")
    ),
    responses(
        (status = 200, description = "Image list", body = [ImageResponse]),
        (status = 401, description = "Missing user identity", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(user_id = %user.user_id, operation = "list_images"))]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Query(query): Query<ListImagesQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let records: Vec<ImageRecord> = if let Some(ref group_id) = query.group_id {
        state.records.list_by_group(group_id).await?
    } else if let Some(ref tag_id) = query.tag_id {
        state.records.list_by_tag(tag_id).await?
    } else {
        let page = Pagination {
            limit: query
                .limit
                .unwrap_or(DEFAULT_LIST_LIMIT)
                .clamp(1, MAX_LIST_LIMIT),
            offset: query.offset.unwrap_or(0).max(0),
            order: query.order.unwrap_or_default(),
        };
        state
            .records
            .list_for_user(&user.user_id, page, query.tag.as_deref())
            .await?
    };

    let responses = records
        .iter()
        .map(|record| urls::image_response(record, state.objects.as_ref()))
        .collect::<Result<Vec<ImageResponse>, _>>()?;

    Ok(Json(responses))
}
