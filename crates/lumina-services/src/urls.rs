//! Access-URL issuance.
//!
//! Raw storage keys never leave the server: responses carry permanent public
//! URLs derived from the keys, and time-boxed signed URLs are generated per
//! request for internal/admin retrieval and never persisted.

use std::time::Duration;

use lumina_core::models::{ImageRecord, ImageResponse, SignedUrlResponse};
use lumina_core::AppError;
use lumina_storage::{MediaKey, ObjectStore};

fn parse_stored_key(key: &str) -> Result<MediaKey, AppError> {
    // A key that was stored but no longer parses means the record is
    // corrupt, not that the client did anything wrong.
    MediaKey::parse(key)
        .map_err(|e| AppError::Internal(format!("stored artifact key is invalid: {}", e)))
}

/// Build the client-facing representation of a record, substituting public
/// URLs for the raw artifact keys.
pub fn image_response(
    record: &ImageRecord,
    objects: &dyn ObjectStore,
) -> Result<ImageResponse, AppError> {
    let original_url = objects.public_url(&parse_stored_key(&record.original_key)?);
    let thumbnail_url = match record.thumbnail_key {
        Some(ref key) => Some(objects.public_url(&parse_stored_key(key)?)),
        None => None,
    };

    Ok(ImageResponse {
        id: record.id,
        user_id: record.user_id.clone(),
        title: record.title.clone(),
        filename: record.filename.clone(),
        tag_ids: record.tag_ids.clone(),
        group_ids: record.group_ids.clone(),
        original_url,
        thumbnail_url,
        version: record.version,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

/// Issue a fresh signed URL for a record's original artifact.
pub async fn signed_original_url(
    record: &ImageRecord,
    objects: &dyn ObjectStore,
    expires_in: Duration,
) -> Result<SignedUrlResponse, AppError> {
    let key = parse_stored_key(&record.original_key)?;
    let url = objects.signed_url(&key, expires_in).await?;
    Ok(SignedUrlResponse {
        url,
        expires_in_secs: expires_in.as_secs(),
    })
}
