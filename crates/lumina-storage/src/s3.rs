use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, GetOptions, ObjectStore as _, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};

use async_trait::async_trait;
use lumina_core::S3Settings;

use crate::keys::MediaKey;
use crate::traits::{HeadInfo, ObjectStore, StorageError, StorageResult, DEFAULT_SIGNED_URL_TTL};

/// S3 object-store implementation
///
/// Works against AWS S3 and S3-compatible providers (MinIO, DigitalOcean
/// Spaces, ...). When a custom endpoint is configured the client switches to
/// path-style addressing, both for requests and for public URLs.
#[derive(Clone)]
pub struct S3Store {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
    timeout: Duration,
}

impl S3Store {
    /// Create a new S3Store from explicit settings.
    ///
    /// Credentials come from the configuration surface, not ambient AWS
    /// environment discovery. `timeout` bounds every remote call.
    pub fn new(settings: S3Settings, timeout: Duration) -> StorageResult<Self> {
        let S3Settings {
            bucket,
            region,
            access_key_id,
            secret_access_key,
            endpoint,
        } = settings;

        let mut builder = AmazonS3Builder::new()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone())
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_access_key);

        if let Some(ref endpoint_url) = endpoint {
            let allow_http = endpoint_url.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint_url.clone())
                .with_allow_http(allow_http)
                .with_virtual_hosted_style_request(false);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Store {
            store,
            bucket,
            region,
            endpoint_url: endpoint,
            timeout,
        })
    }

    fn timeout_error(&self, op: &str, key: &MediaKey) -> StorageError {
        StorageError::Timeout(format!(
            "S3 {} for {} timed out after {}s",
            op,
            key,
            self.timeout.as_secs()
        ))
    }

    /// Generate the public URL for an object.
    ///
    /// For AWS S3 this is `https://{bucket}.s3.{region}.amazonaws.com/{key}`;
    /// with a custom endpoint, path-style `{endpoint}/{bucket}/{key}`.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

fn put_attributes(content_type: &str, metadata: HashMap<String, String>) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.to_string().into());
    for (name, value) in metadata {
        attributes.insert(Attribute::Metadata(name.into()), value.into());
    }
    attributes
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        key: &MediaKey,
        data: Vec<u8>,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<()> {
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(key.to_string());
        let opts = PutOptions {
            attributes: put_attributes(content_type, metadata),
            ..Default::default()
        };

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = tokio::time::timeout(
            self.timeout,
            self.store.put_opts(&location, PutPayload::from(bytes), opts),
        )
        .await
        .map_err(|_| self.timeout_error("put", key))?;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 put failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 put successful"
        );

        Ok(())
    }

    async fn get(&self, key: &MediaKey) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> =
            tokio::time::timeout(self.timeout, self.store.get(&location))
                .await
                .map_err(|_| self.timeout_error("get", key))?;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 get failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = tokio::time::timeout(self.timeout, result.bytes())
            .await
            .map_err(|_| self.timeout_error("get", key))?
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 get successful"
        );

        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &MediaKey) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> =
            tokio::time::timeout(self.timeout, self.store.delete(&location))
                .await
                .map_err(|_| self.timeout_error("delete", key))?;

        match result {
            Ok(()) => {}
            // Deleting an absent key is treated as already done.
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(
                    bucket = %self.bucket,
                    key = %key,
                    "S3 delete on absent key"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &MediaKey) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        let result = tokio::time::timeout(self.timeout, self.store.head(&location))
            .await
            .map_err(|_| self.timeout_error("head", key))?;
        match result {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn head_info(&self, key: &MediaKey) -> StorageResult<HeadInfo> {
        let location = Path::from(key.to_string());
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        let result = tokio::time::timeout(self.timeout, self.store.get_opts(&location, options))
            .await
            .map_err(|_| self.timeout_error("head", key))?
            .map_err(|e| match e {
                ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
                other => StorageError::BackendError(other.to_string()),
            })?;

        let mut content_type = None;
        let mut metadata = HashMap::new();
        for (attribute, value) in result.attributes.iter() {
            match attribute {
                Attribute::ContentType => content_type = Some(value.to_string()),
                Attribute::Metadata(name) => {
                    metadata.insert(name.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        let signed_url = self.signed_url(key, DEFAULT_SIGNED_URL_TTL).await?;

        Ok(HeadInfo {
            size: result.meta.size,
            last_modified: result.meta.last_modified,
            content_type,
            metadata,
            signed_url: Some(signed_url),
        })
    }

    fn public_url(&self, key: &MediaKey) -> String {
        self.generate_url(&key.to_string())
    }

    async fn signed_url(&self, key: &MediaKey, expires_in: Duration) -> StorageResult<String> {
        let location = Path::from(key.to_string());
        let url_result: ObjectResult<_> = tokio::time::timeout(
            self.timeout,
            self.store.signed_url(Method::GET, &location, expires_in),
        )
        .await
        .map_err(|_| self.timeout_error("sign", key))?;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }
}
