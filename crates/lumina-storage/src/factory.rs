use std::sync::Arc;

use lumina_core::{Config, StorageBackendKind};

#[cfg(feature = "storage-local")]
use crate::LocalStore;
#[cfg(feature = "storage-s3")]
use crate::S3Store;
use crate::{ObjectStore, StorageError, StorageResult};

/// Create an object-store backend based on configuration
pub async fn create_object_store(config: &Config) -> StorageResult<Arc<dyn ObjectStore>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackendKind::S3 => {
            let settings = config.s3.clone().ok_or_else(|| {
                StorageError::ConfigError("S3 settings not configured".to_string())
            })?;
            let store = S3Store::new(settings, config.storage_timeout)?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackendKind::S3 => Err(StorageError::ConfigError(
            "S3 backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackendKind::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let store = LocalStore::new(base_path, base_url).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackendKind::Local => Err(StorageError::ConfigError(
            "Local backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
