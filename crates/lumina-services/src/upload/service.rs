//! Upload saga.
//!
//! Sequences validation → thumbnail derivation → dual object-store writes →
//! metadata record creation. The two artifact writes and the record insert
//! are not transactional across stores, so every state reached after the
//! first write is covered by the rollback log: any later failure (or
//! cancellation) deletes the artifacts stored so far in this run.

use std::collections::HashMap;
use std::sync::Arc;

use lumina_core::models::{ImageRecord, NewImageRecord, UploadRequest};
use lumina_core::AppError;
use lumina_db::RecordStore;
use lumina_processing::{derive_thumbnail, UploadGate, THUMBNAIL_CONTENT_TYPE};
use lumina_storage::{MediaKey, ObjectStore};

use super::rollback::RollbackLog;

/// Progress of one upload run. Terminal success is `RecordCreated`; any
/// state may fail, in which case the rollback log undoes stored artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Received,
    Validated,
    Thumbnailed,
    OriginalStored,
    ThumbnailStored,
    RecordCreated,
}

/// Upload orchestrator.
///
/// Dependencies are injected; the pipeline holds no ambient state and is
/// safe to share across concurrent requests.
#[derive(Clone)]
pub struct UploadPipeline {
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn RecordStore>,
    gate: UploadGate,
    namespace: String,
}

impl UploadPipeline {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn RecordStore>,
        gate: UploadGate,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            objects,
            records,
            gate,
            namespace: namespace.into(),
        }
    }

    /// Run the full upload saga for one request.
    ///
    /// Failures before the first store call leave no side effects, so the
    /// whole call is safe to retry. Failures after it trigger compensation:
    /// no partial run leaves an `exists()`-true artifact behind.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, filename = %request.filename))]
    pub async fn upload(&self, request: UploadRequest) -> Result<ImageRecord, AppError> {
        let mut state = UploadState::Received;
        tracing::debug!(state = ?state, size_bytes = request.data.len(), "upload started");

        self.gate.validate(&request)?;
        state = UploadState::Validated;
        tracing::debug!(state = ?state, "upload request validated");

        let thumbnail = derive_thumbnail(&request.data)?;
        state = UploadState::Thumbnailed;
        tracing::debug!(state = ?state, thumbnail_bytes = thumbnail.len(), "thumbnail derived");

        // Independent entity ids: sibling artifacts share nothing in the key.
        let original_key = MediaKey::generate(&self.namespace, &request.filename)?;
        let thumbnail_key = MediaKey::generate(&self.namespace, &request.filename)?;

        let metadata = HashMap::from([
            ("original-filename".to_string(), request.filename.clone()),
            ("uploaded-by".to_string(), request.user_id.clone()),
        ]);

        let mut rollback = RollbackLog::new(self.objects.clone());

        self.objects
            .put(
                &original_key,
                request.data,
                &request.content_type,
                metadata.clone(),
            )
            .await?;
        rollback.record(original_key.clone());
        state = UploadState::OriginalStored;
        tracing::debug!(state = ?state, key = %original_key, "original stored");

        if let Err(e) = self
            .objects
            .put(&thumbnail_key, thumbnail, THUMBNAIL_CONTENT_TYPE, metadata)
            .await
        {
            tracing::error!(state = ?state, error = %e, "thumbnail store failed; rolling back");
            rollback.undo().await;
            return Err(e.into());
        }
        rollback.record(thumbnail_key.clone());
        state = UploadState::ThumbnailStored;
        tracing::debug!(state = ?state, key = %thumbnail_key, "thumbnail stored");

        let new_record = NewImageRecord {
            user_id: request.user_id,
            title: request.title,
            filename: request.filename,
            tag_ids: request.tag_ids,
            group_ids: request.group_ids,
            original_key: original_key.to_string(),
            thumbnail_key: Some(thumbnail_key.to_string()),
        };

        match self.records.create(new_record).await {
            Ok(record) => {
                rollback.defuse();
                state = UploadState::RecordCreated;
                tracing::info!(state = ?state, image_id = %record.id, "upload complete");
                Ok(record)
            }
            Err(e) => {
                tracing::error!(state = ?state, error = %e, "record creation failed; rolling back");
                rollback.undo().await;
                Err(e)
            }
        }
    }
}
