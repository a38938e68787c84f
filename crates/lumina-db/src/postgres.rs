//! Postgres implementation of the metadata store contract.

use async_trait::async_trait;
use lumina_core::models::{ImageRecord, ImageRecordUpdate, ListOrder, NewImageRecord, Pagination};
use lumina_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::traits::RecordStore;

const COLUMNS: &str = "id, user_id, title, filename, tag_ids, group_ids, \
                       original_key, thumbnail_key, version, created_at, updated_at";

/// Normalize an id list to set semantics: sorted, deduplicated.
fn normalize_set(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids.dedup();
    ids
}

fn check_invariants(records: &[ImageRecord]) -> Result<(), AppError> {
    for record in records {
        record.ensure_invariants()?;
    }
    Ok(())
}

/// Image record repository backed by Postgres.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "image_records", db.operation = "insert"))]
    async fn create(&self, record: NewImageRecord) -> Result<ImageRecord, AppError> {
        // The gate enforces this before any I/O; re-checked here because the
        // schema constraint would otherwise surface as an opaque DB error.
        if record.group_ids.is_empty() {
            return Err(AppError::GroupsRequired);
        }

        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO image_records \
                 (id, user_id, title, filename, tag_ids, group_ids, original_key, thumbnail_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            COLUMNS
        );

        let created = sqlx::query_as::<_, ImageRecord>(&sql)
            .bind(id)
            .bind(&record.user_id)
            .bind(&record.title)
            .bind(&record.filename)
            .bind(normalize_set(record.tag_ids.clone()))
            .bind(normalize_set(record.group_ids.clone()))
            .bind(&record.original_key)
            .bind(&record.thumbnail_key)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(image_id = %created.id, user_id = %created.user_id, "image record created");

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "image_records", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> Result<Option<ImageRecord>, AppError> {
        let sql = format!("SELECT {} FROM image_records WHERE id = $1", COLUMNS);
        let record = sqlx::query_as::<_, ImageRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(ref record) = record {
            record.ensure_invariants()?;
        }

        Ok(record)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "image_records", db.operation = "update"))]
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

        let sql = format!(
            "UPDATE image_records \
             SET title = COALESCE($3, title), \
                 tag_ids = COALESCE($4, tag_ids), \
                 group_ids = COALESCE($5, group_ids), \
                 version = version + 1, \
                 updated_at = now() \
             WHERE id = $1 AND version = $2 \
             RETURNING {}",
            COLUMNS
        );

        let updated = sqlx::query_as::<_, ImageRecord>(&sql)
            .bind(id)
            .bind(expected_version)
            .bind(&changes.title)
            .bind(changes.tag_ids.map(normalize_set))
            .bind(changes.group_ids.map(normalize_set))
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(record) => {
                record.ensure_invariants()?;
                Ok(record)
            }
            // No row matched: either the record is gone or the version is
            // stale. Disambiguate for the caller.
            None => match self.get(id).await? {
                Some(current) => Err(AppError::Conflict(format!(
                    "version {} is stale (current version is {})",
                    expected_version, current.version
                ))),
                None => Err(AppError::NotFound("Image not found".to_string())),
            },
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "image_records", db.operation = "delete"))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM image_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(image_id = %id, "image record deleted");
        }
        Ok(deleted)
    }

    #[tracing::instrument(skip(self), fields(db.table = "image_records", db.operation = "select"))]
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<ImageRecord>, AppError> {
        let sql = format!(
            "SELECT {} FROM image_records WHERE $1 = ANY(group_ids) ORDER BY created_at DESC",
            COLUMNS
        );
        let records = sqlx::query_as::<_, ImageRecord>(&sql)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;

        check_invariants(&records)?;
        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "image_records", db.operation = "select"))]
    async fn list_by_tag(&self, tag_id: &str) -> Result<Vec<ImageRecord>, AppError> {
        let sql = format!(
            "SELECT {} FROM image_records WHERE $1 = ANY(tag_ids) ORDER BY created_at DESC",
            COLUMNS
        );
        let records = sqlx::query_as::<_, ImageRecord>(&sql)
            .bind(tag_id)
            .fetch_all(&self.pool)
            .await?;

        check_invariants(&records)?;
        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "image_records", db.operation = "select"))]
    async fn list_for_user(
        &self,
        user_id: &str,
        page: Pagination,
        tag_id: Option<&str>,
    ) -> Result<Vec<ImageRecord>, AppError> {
        let order = match page.order {
            ListOrder::Asc => "ASC",
            ListOrder::Desc => "DESC",
        };
        let tag_clause = if tag_id.is_some() {
            "AND $4 = ANY(tag_ids)"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {} FROM image_records WHERE user_id = $1 {} \
             ORDER BY created_at {} LIMIT $2 OFFSET $3",
            COLUMNS, tag_clause, order
        );

        let mut query = sqlx::query_as::<_, ImageRecord>(&sql)
            .bind(user_id)
            .bind(page.limit)
            .bind(page.offset);
        if let Some(tag_id) = tag_id {
            query = query.bind(tag_id);
        }

        let records = query.fetch_all(&self.pool).await?;

        check_invariants(&records)?;
        Ok(records)
    }
}
