//! Deletion flow.
//!
//! Artifact cleanup is best-effort (the object store holds the
//! non-authoritative copy); metadata deletion is authoritative and must not
//! silently fail.

use std::sync::Arc;

use lumina_core::AppError;
use lumina_db::RecordStore;
use lumina_storage::{MediaKey, ObjectStore};
use uuid::Uuid;

/// Deletion orchestrator.
#[derive(Clone)]
pub struct DeletionService {
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn RecordStore>,
}

impl DeletionService {
    pub fn new(objects: Arc<dyn ObjectStore>, records: Arc<dyn RecordStore>) -> Self {
        Self { objects, records }
    }

    /// Delete an image: look up the record, attempt both artifact deletes
    /// (failures logged and tolerated), then remove the metadata record
    /// (failures propagate).
    #[tracing::instrument(skip(self), fields(image_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let record = self
            .records
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        self.delete_artifact(id, &record.original_key, "original")
            .await;
        if let Some(ref thumbnail_key) = record.thumbnail_key {
            self.delete_artifact(id, thumbnail_key, "thumbnail").await;
        }

        let deleted = self.records.delete(id).await?;
        if !deleted {
            // Raced with a concurrent delete between lookup and removal.
            return Err(AppError::NotFound("Image not found".to_string()));
        }

        tracing::info!(image_id = %id, "image deleted");
        Ok(())
    }

    /// Best-effort removal of one artifact. Never fails the deletion.
    async fn delete_artifact(&self, id: Uuid, key: &str, kind: &'static str) {
        let key = match MediaKey::parse(key) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(
                    image_id = %id,
                    error = %e,
                    kind,
                    "stored artifact key is unparseable; skipping cleanup"
                );
                return;
            }
        };

        if let Err(e) = self.objects.delete(&key).await {
            tracing::warn!(
                image_id = %id,
                key = %key,
                kind,
                error = %e,
                "artifact delete failed during image deletion"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use lumina_core::models::NewImageRecord;

    use super::*;
    use crate::test_helpers::{MockObjectStore, MockRecordStore};

    async fn seeded_record(
        objects: &Arc<MockObjectStore>,
        records: &Arc<MockRecordStore>,
        store_artifacts: bool,
    ) -> lumina_core::models::ImageRecord {
        let original_key = MediaKey::generate("media", "photo.jpg").unwrap();
        let thumbnail_key = MediaKey::generate("media", "photo.jpg").unwrap();

        if store_artifacts {
            for key in [&original_key, &thumbnail_key] {
                objects
                    .put(key, b"bytes".to_vec(), "image/jpeg", Default::default())
                    .await
                    .unwrap();
            }
        }

        records
            .create(NewImageRecord {
                user_id: "u1".to_string(),
                title: None,
                filename: "photo.jpg".to_string(),
                tag_ids: vec![],
                group_ids: vec!["g1".to_string()],
                original_key: original_key.to_string(),
                thumbnail_key: Some(thumbnail_key.to_string()),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_delete_removes_artifacts_and_record() {
        let objects = Arc::new(MockObjectStore::new());
        let records = Arc::new(MockRecordStore::new());
        let record = seeded_record(&objects, &records, true).await;

        DeletionService::new(objects.clone(), records.clone())
            .delete(record.id)
            .await
            .unwrap();

        assert!(objects.is_empty());
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let objects = Arc::new(MockObjectStore::new());
        let records = Arc::new(MockRecordStore::new());

        let err = DeletionService::new(objects.clone(), records)
            .delete(Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(objects.call_count(), 0);
    }

    #[tokio::test]
    async fn test_absent_artifacts_do_not_block_deletion() {
        // The original was never stored (or already cleaned up); the
        // metadata record must still be removed.
        let objects = Arc::new(MockObjectStore::new());
        let records = Arc::new(MockRecordStore::new());
        let record = seeded_record(&objects, &records, false).await;

        DeletionService::new(objects, records.clone())
            .delete(record.id)
            .await
            .unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_failing_artifact_deletes_do_not_block_deletion() {
        let objects = Arc::new(MockObjectStore::new());
        let records = Arc::new(MockRecordStore::new());
        let record = seeded_record(&objects, &records, true).await;
        objects.fail_deletes(true);

        DeletionService::new(objects.clone(), records.clone())
            .delete(record.id)
            .await
            .unwrap();

        // Metadata is gone even though both artifact deletes failed.
        assert!(records.is_empty());
        assert!(!objects.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_delete_failure_propagates() {
        let objects = Arc::new(MockObjectStore::new());
        let records = Arc::new(MockRecordStore::new());
        let record = seeded_record(&objects, &records, true).await;
        records.fail_delete(true);

        let err = DeletionService::new(objects, records.clone())
            .delete(record.id)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        records.fail_delete(false);
        assert!(records.get(record.id).await.unwrap().is_some());
    }
}
