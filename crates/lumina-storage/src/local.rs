use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;

use crate::keys::MediaKey;
use crate::mime::content_type_for;
use crate::traits::{HeadInfo, ObjectStore, StorageError, StorageResult};

/// Local filesystem object-store implementation
///
/// Development and test backend. Content type is derived from the filename
/// extension on reads, user metadata is not persisted, and URL signing is not
/// supported.
#[derive(Clone)]
pub struct LocalStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStore {
    /// Create a new LocalStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/lumina/media")
    /// * `base_url` - Base URL for serving objects (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore {
            base_path,
            base_url,
        })
    }

    /// Convert a key to a filesystem path.
    ///
    /// Key segments are validated at construction, but the rendered form is
    /// re-checked here so a hostile key string can never escape the base
    /// directory.
    fn key_to_path(&self, key: &MediaKey) -> StorageResult<PathBuf> {
        let rendered = key.to_string();
        if rendered.contains("..") || rendered.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(rendered))
    }

    fn generate_url(&self, key: &MediaKey) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(
        &self,
        key: &MediaKey,
        data: Vec<u8>,
        _content_type: &str,
        _metadata: HashMap<String, String>,
    ) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let size = data.len() as u64;
        fs::write(&path, data).await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "local put failed");
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::debug!(key = %key, size_bytes = size, "local put successful");
        Ok(())
    }

    async fn get(&self, key: &MediaKey) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    async fn delete(&self, key: &MediaKey) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Deleting an absent key is treated as already done.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key = %key, "local delete on absent key");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn exists(&self, key: &MediaKey) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        match fs::metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn head_info(&self, key: &MediaKey) -> StorageResult<HeadInfo> {
        let path = self.key_to_path(key)?;
        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => return Err(StorageError::BackendError(e.to_string())),
        };

        let last_modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(HeadInfo {
            size: meta.len(),
            last_modified,
            content_type: Some(content_type_for(key.filename()).to_string()),
            metadata: HashMap::new(),
            signed_url: None,
        })
    }

    fn public_url(&self, key: &MediaKey) -> String {
        self.generate_url(key)
    }

    async fn signed_url(&self, _key: &MediaKey, _expires_in: Duration) -> StorageResult<String> {
        Err(StorageError::ConfigError(
            "URL signing is not supported by the local storage backend".to_string(),
        ))
    }
}
