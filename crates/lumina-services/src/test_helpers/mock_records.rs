//! Mock metadata store implementation for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use lumina_core::models::{
    ImageRecord, ImageRecordUpdate, ListOrder, NewImageRecord, Pagination,
};
use lumina_core::AppError;
use lumina_db::RecordStore;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, ImageRecord>,
    fail_create: bool,
    fail_delete: bool,
}

/// In-memory record store honoring the [`RecordStore`] contract, including
/// the load-time invariant check and optimistic-concurrency updates.
#[derive(Default)]
pub struct MockRecordStore {
    inner: Mutex<Inner>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(&self, fail: bool) {
        self.inner.lock().unwrap().fail_create = fail;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.inner.lock().unwrap().fail_delete = fail;
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().records.is_empty()
    }

    /// Insert a record verbatim, bypassing contract checks. For tests that
    /// need corrupt rows (e.g. an empty group set).
    pub fn seed(&self, record: ImageRecord) {
        self.inner.lock().unwrap().records.insert(record.id, record);
    }
}

fn normalize_set(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids.dedup();
    ids
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn create(&self, record: NewImageRecord) -> Result<ImageRecord, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_create {
            return Err(AppError::Internal(
                "injected record store failure".to_string(),
            ));
        }
        if record.group_ids.is_empty() {
            return Err(AppError::GroupsRequired);
        }

        let now = Utc::now();
        let created = ImageRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            title: record.title,
            filename: record.filename,
            tag_ids: normalize_set(record.tag_ids),
            group_ids: normalize_set(record.group_ids),
            original_key: record.original_key,
            thumbnail_key: record.thumbnail_key,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        inner.records.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ImageRecord>, AppError> {
        let inner = self.inner.lock().unwrap();
        match inner.records.get(&id) {
            Some(record) => {
                record.ensure_invariants()?;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        id: Uuid,
        expected_version: i64,
        changes: ImageRecordUpdate,
    ) -> Result<ImageRecord, AppError> {
        if let Some(ref group_ids) = changes.group_ids {
            if group_ids.is_empty() {
                return Err(AppError::GroupsRequired);
            }
        }

        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        if record.version != expected_version {
            return Err(AppError::Conflict(format!(
                "version {} is stale (current version is {})",
                expected_version, record.version
            )));
        }

        if let Some(title) = changes.title {
            record.title = Some(title);
        }
        if let Some(tag_ids) = changes.tag_ids {
            record.tag_ids = normalize_set(tag_ids);
        }
        if let Some(group_ids) = changes.group_ids {
            record.group_ids = normalize_set(group_ids);
        }
        record.version += 1;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete {
            return Err(AppError::Internal(
                "injected record store failure".to_string(),
            ));
        }
        Ok(inner.records.remove(&id).is_some())
    }

    async fn list_by_group(&self, group_id: &str) -> Result<Vec<ImageRecord>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<ImageRecord> = inner
            .records
            .values()
            .filter(|r| r.group_ids.iter().any(|g| g == group_id))
            .cloned()
            .collect();
        for record in &records {
            record.ensure_invariants()?;
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn list_by_tag(&self, tag_id: &str) -> Result<Vec<ImageRecord>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<ImageRecord> = inner
            .records
            .values()
            .filter(|r| r.tag_ids.iter().any(|t| t == tag_id))
            .cloned()
            .collect();
        for record in &records {
            record.ensure_invariants()?;
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        page: Pagination,
        tag_id: Option<&str>,
    ) -> Result<Vec<ImageRecord>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<ImageRecord> = inner
            .records
            .values()
            .filter(|r| r.user_id == user_id)
            .filter(|r| match tag_id {
                Some(tag) => r.tag_ids.iter().any(|t| t == tag),
                None => true,
            })
            .cloned()
            .collect();
        for record in &records {
            record.ensure_invariants()?;
        }
        match page.order {
            ListOrder::Asc => records.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            ListOrder::Desc => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        Ok(records
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect())
    }
}
