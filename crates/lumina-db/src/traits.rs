//! Metadata store contract.

use async_trait::async_trait;
use lumina_core::models::{ImageRecord, ImageRecordUpdate, NewImageRecord, Pagination};
use lumina_core::AppError;
use uuid::Uuid;

/// Narrow create/get/update/delete contract over the metadata store.
///
/// Implementations must be safe for concurrent use. Contract obligations:
///
/// - `get` and the listing methods run the record invariant check on every
///   loaded row; a row with an empty group set surfaces
///   [`AppError::InvariantViolation`] instead of being silently repaired.
/// - `update` uses optimistic concurrency: the caller supplies the version
///   it read, and a mismatch yields [`AppError::Conflict`]. Artifact keys
///   are never updated. An update that would empty the group set yields
///   [`AppError::GroupsRequired`].
/// - `delete` returns whether a row was removed; failures propagate because
///   metadata deletion is authoritative (unlike best-effort artifact
///   cleanup).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record, assigning id, version and timestamps.
    async fn create(&self, record: NewImageRecord) -> Result<ImageRecord, AppError>;

    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<ImageRecord>, AppError>;

    /// Apply a partial update, preconditioned on `expected_version`.
    async fn update(
        &self,
        id: Uuid,
        expected_version: i64,
        changes: ImageRecordUpdate,
    ) -> Result<ImageRecord, AppError>;

    /// Delete a record by id. Returns `false` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// All records visible to a group.
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<ImageRecord>, AppError>;

    /// All records carrying a tag.
    async fn list_by_tag(&self, tag_id: &str) -> Result<Vec<ImageRecord>, AppError>;

    /// Paginated listing of a user's records, optionally filtered by tag.
    async fn list_for_user(
        &self,
        user_id: &str,
        page: Pagination,
        tag_id: Option<&str>,
    ) -> Result<Vec<ImageRecord>, AppError>;
}
