//! Image record models and API shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Metadata record for a stored image and its derived thumbnail.
///
/// Created only after both artifacts are durably stored. The artifact keys
/// are immutable for the life of the record; edits may change title, tags and
/// groups but never the keys. `group_ids` is never empty for a live record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImageRecord {
    pub id: Uuid,
    pub user_id: String,
    pub title: Option<String>,
    pub filename: String,
    /// Set semantics; order is irrelevant.
    pub tag_ids: Vec<String>,
    pub group_ids: Vec<String>,
    pub original_key: String,
    pub thumbnail_key: Option<String>,
    /// Optimistic-concurrency token, bumped on every update.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Check record invariants after loading from the metadata store.
    ///
    /// A live record with an empty group set indicates corruption and is
    /// surfaced as an error rather than silently repaired.
    pub fn ensure_invariants(&self) -> Result<(), AppError> {
        if self.group_ids.is_empty() {
            tracing::error!(
                image_id = %self.id,
                "image record loaded with an empty group set"
            );
            return Err(AppError::InvariantViolation(format!(
                "image record {} has an empty group set",
                self.id
            )));
        }
        Ok(())
    }
}

/// Input for creating a new image record.
///
/// The store assigns id, version and timestamps.
#[derive(Debug, Clone)]
pub struct NewImageRecord {
    pub user_id: String,
    pub title: Option<String>,
    pub filename: String,
    pub tag_ids: Vec<String>,
    pub group_ids: Vec<String>,
    pub original_key: String,
    pub thumbnail_key: Option<String>,
}

/// Partial update of an image record. `None` fields are left unchanged.
/// Artifact keys are not updatable.
#[derive(Debug, Clone, Default)]
pub struct ImageRecordUpdate {
    pub title: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub group_ids: Option<Vec<String>>,
}

/// Sort order for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    Asc,
    #[default]
    Desc,
}

/// Pagination and ordering for the user-scoped listing.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub order: ListOrder,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            limit: 50,
            offset: 0,
            order: ListOrder::Desc,
        }
    }
}

/// JSON body for image updates.
///
/// `version` is the optimistic-concurrency precondition: it must match the
/// current record version or the update is rejected with a conflict.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateImageRequest {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub group_ids: Option<Vec<String>>,
    pub version: i64,
}

/// Client-facing image representation.
///
/// Raw storage keys never leave the server; responses carry derived public
/// URLs instead.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    pub id: Uuid,
    pub user_id: String,
    pub title: Option<String>,
    pub filename: String,
    pub tag_ids: Vec<String>,
    pub group_ids: Vec<String>,
    pub original_url: String,
    pub thumbnail_url: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response for on-demand signed URL issuance. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignedUrlResponse {
    pub url: String,
    pub expires_in_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(group_ids: Vec<String>) -> ImageRecord {
        ImageRecord {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            title: None,
            filename: "photo.jpg".to_string(),
            tag_ids: vec![],
            group_ids,
            original_key: "media/a/photo.jpg".to_string(),
            thumbnail_key: Some("media/b/photo.jpg".to_string()),
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_invariants_hold_for_live_record() {
        assert!(record(vec!["g1".to_string()]).ensure_invariants().is_ok());
    }

    #[test]
    fn test_empty_group_set_is_an_invariant_violation() {
        let err = record(vec![]).ensure_invariants().unwrap_err();
        assert!(matches!(err, AppError::InvariantViolation(_)));
    }
}
