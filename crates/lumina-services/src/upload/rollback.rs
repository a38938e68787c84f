//! Compensation log for the upload saga.

use std::sync::Arc;

use lumina_storage::{MediaKey, ObjectStore};

/// Replayable log of artifacts stored during one upload run.
///
/// Every successful put is recorded; on failure [`RollbackLog::undo`] deletes
/// the recorded keys in reverse order. Once the metadata record exists the
/// log is defused and the artifacts belong to the record.
///
/// If the upload future is dropped before the log is defused or undone (the
/// caller cancelled mid-upload), the drop guard spawns the same compensation
/// in the background, so cancellation behaves exactly like failure.
pub(crate) struct RollbackLog {
    objects: Arc<dyn ObjectStore>,
    stored: Vec<MediaKey>,
    defused: bool,
}

impl RollbackLog {
    pub(crate) fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            objects,
            stored: Vec::new(),
            defused: false,
        }
    }

    /// Record a key that was just stored and may need compensation.
    pub(crate) fn record(&mut self, key: MediaKey) {
        self.stored.push(key);
    }

    /// The run committed; stored artifacts are now owned by the record.
    pub(crate) fn defuse(mut self) {
        self.defused = true;
    }

    /// Delete every recorded artifact, newest first. Best-effort: a failed
    /// delete is logged as an orphan and does not stop the remaining undos.
    pub(crate) async fn undo(mut self) {
        self.defused = true;
        let keys = std::mem::take(&mut self.stored);
        undo_keys(self.objects.as_ref(), keys).await;
    }
}

async fn undo_keys(objects: &dyn ObjectStore, keys: Vec<MediaKey>) {
    for key in keys.into_iter().rev() {
        match objects.delete(&key).await {
            Ok(()) => {
                tracing::info!(key = %key, "compensated stored artifact");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    key = %key,
                    "compensation delete failed; artifact orphaned"
                );
            }
        }
    }
}

impl Drop for RollbackLog {
    fn drop(&mut self) {
        if self.defused || self.stored.is_empty() {
            return;
        }
        let keys = std::mem::take(&mut self.stored);
        let objects = self.objects.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(
                    artifacts = keys.len(),
                    "upload cancelled mid-flight; compensating stored artifacts"
                );
                handle.spawn(async move {
                    undo_keys(objects.as_ref(), keys).await;
                });
            }
            Err(_) => {
                for key in &keys {
                    tracing::warn!(key = %key, "no runtime available to compensate; artifact orphaned");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;
    use crate::test_helpers::MockObjectStore;

    async fn stored_key(objects: &Arc<MockObjectStore>, filename: &str) -> MediaKey {
        let key = MediaKey::generate("media", filename).unwrap();
        objects
            .put(&key, b"data".to_vec(), "image/jpeg", HashMap::new())
            .await
            .unwrap();
        key
    }

    #[tokio::test]
    async fn test_undo_removes_recorded_artifacts() {
        let objects = Arc::new(MockObjectStore::new());
        let a = stored_key(&objects, "a.jpg").await;
        let b = stored_key(&objects, "b.jpg").await;

        let mut log = RollbackLog::new(objects.clone());
        log.record(a.clone());
        log.record(b.clone());
        log.undo().await;

        assert!(!objects.exists(&a).await.unwrap());
        assert!(!objects.exists(&b).await.unwrap());
    }

    #[tokio::test]
    async fn test_defused_log_keeps_artifacts() {
        let objects = Arc::new(MockObjectStore::new());
        let key = stored_key(&objects, "keep.jpg").await;

        let mut log = RollbackLog::new(objects.clone());
        log.record(key.clone());
        log.defuse();

        assert!(objects.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_log_compensates_in_background() {
        let objects = Arc::new(MockObjectStore::new());
        let key = stored_key(&objects, "cancelled.jpg").await;

        let mut log = RollbackLog::new(objects.clone());
        log.record(key.clone());
        drop(log);

        // The drop guard spawns compensation; wait for it to land.
        for _ in 0..100 {
            if !objects.exists(&key).await.unwrap() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("dropped rollback log did not compensate stored artifact");
    }
}
