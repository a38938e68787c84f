//! Mock object-store implementation for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lumina_storage::{HeadInfo, MediaKey, ObjectStore, StorageError, StorageResult};

/// An object held by the mock store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, StoredObject>,
    calls: usize,
    put_calls: usize,
    /// Puts with a 1-based index at or beyond this threshold fail.
    fail_puts_from: Option<usize>,
    fail_deletes: bool,
}

/// In-memory object store with failure injection.
#[derive(Default)]
pub struct MockObjectStore {
    inner: Mutex<Inner>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every put starting with the `n`-th (1-based) fail.
    pub fn fail_puts_from(&self, n: usize) {
        self.inner.lock().unwrap().fail_puts_from = Some(n);
    }

    /// Make every delete fail (transient outage).
    pub fn fail_deletes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_deletes = fail;
    }

    /// Total object-store calls made (any operation).
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    /// Fetch a stored object for assertions.
    pub fn object(&self, key: &MediaKey) -> Option<StoredObject> {
        self.inner
            .lock()
            .unwrap()
            .objects
            .get(&key.to_string())
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put(
        &self,
        key: &MediaKey,
        data: Vec<u8>,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        inner.put_calls += 1;
        if let Some(threshold) = inner.fail_puts_from {
            if inner.put_calls >= threshold {
                return Err(StorageError::UploadFailed("injected put failure".to_string()));
            }
        }
        inner.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                metadata,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &MediaKey) -> StorageResult<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        inner
            .objects
            .get(&key.to_string())
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &MediaKey) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        if inner.fail_deletes {
            return Err(StorageError::DeleteFailed(
                "injected delete failure".to_string(),
            ));
        }
        // Absent keys are fine: delete is idempotent.
        inner.objects.remove(&key.to_string());
        Ok(())
    }

    async fn exists(&self, key: &MediaKey) -> StorageResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        Ok(inner.objects.contains_key(&key.to_string()))
    }

    async fn head_info(&self, key: &MediaKey) -> StorageResult<HeadInfo> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        let object = inner
            .objects
            .get(&key.to_string())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(HeadInfo {
            size: object.data.len() as u64,
            last_modified: Utc::now(),
            content_type: Some(object.content_type.clone()),
            metadata: object.metadata.clone(),
            signed_url: Some(format!("https://cdn.test/{}?sig=test", key)),
        })
    }

    fn public_url(&self, key: &MediaKey) -> String {
        format!("https://cdn.test/{}", key)
    }

    async fn signed_url(&self, key: &MediaKey, expires_in: Duration) -> StorageResult<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        Ok(format!(
            "https://cdn.test/{}?sig=test&expires={}",
            key,
            expires_in.as_secs()
        ))
    }
}
