//! Object-store abstraction trait
//!
//! This module defines the [`ObjectStore`] trait that all storage backends
//! must implement, plus the error type shared by the backends.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lumina_core::AppError;
use thiserror::Error;

use crate::keys::MediaKey;

/// Default lifetime of signed capability URLs.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                AppError::NotFound(format!("Object not found: {}", key))
            }
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(e) => AppError::Internal(format!("IO error: {}", e)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::Timeout(msg)
            | StorageError::BackendError(msg) => AppError::Storage(msg),
        }
    }
}

/// Metadata about a stored object, as returned by [`ObjectStore::head_info`].
#[derive(Debug, Clone)]
pub struct HeadInfo {
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub content_type: Option<String>,
    /// User metadata recorded at put time. Backends that cannot persist it
    /// (the local filesystem backend) return an empty map.
    pub metadata: HashMap<String, String>,
    /// A fresh signed URL with the default TTL, when the backend supports
    /// signing. Never cached past its expiry.
    pub signed_url: Option<String>,
}

/// Object-store abstraction trait
///
/// All backends (S3, local filesystem) implement this trait so the pipeline
/// and the HTTP surface never couple to a concrete provider. Implementations
/// must be safe for concurrent use, and every remote call must be bounded by
/// the configured timeout.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object under `key`. Overwrites are idempotent.
    async fn put(
        &self,
        key: &MediaKey,
        data: Vec<u8>,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<()>;

    /// Fetch an object's bytes. Absent keys yield [`StorageError::NotFound`].
    async fn get(&self, key: &MediaKey) -> StorageResult<Vec<u8>>;

    /// Delete an object. Deleting an absent key is not an error: a second
    /// delete of the same key always succeeds.
    async fn delete(&self, key: &MediaKey) -> StorageResult<()>;

    /// Check whether an object exists. Not-found responses are `false`; all
    /// other transport errors propagate.
    async fn exists(&self, key: &MediaKey) -> StorageResult<bool>;

    /// Fetch size, modification time, content type, user metadata and a
    /// fresh signed URL for an object.
    async fn head_info(&self, key: &MediaKey) -> StorageResult<HeadInfo>;

    /// Derive the permanent public URL for a key. Pure string formatting, no
    /// network call; assumes the bucket policy allows public reads.
    fn public_url(&self, key: &MediaKey) -> String;

    /// Generate a time-boxed capability URL for reading an object. Valid
    /// only until `expires_in` elapses; callers must not cache it past that.
    async fn signed_url(&self, key: &MediaKey, expires_in: Duration) -> StorageResult<String>;
}
