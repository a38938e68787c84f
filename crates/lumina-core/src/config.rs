//! Configuration module
//!
//! Environment-driven configuration for the API binary and services:
//! server, database, object-store backend selection and credentials, and
//! media pipeline settings.

use std::env;
use std::time::Duration;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MEDIA_NAMESPACE: &str = "media";

/// Object-store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    S3,
    Local,
}

impl StorageBackendKind {
    fn parse(s: &str) -> Result<Self, anyhow::Error> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackendKind::S3),
            "local" => Ok(StorageBackendKind::Local),
            other => Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
        }
    }
}

/// S3 connection settings.
///
/// `endpoint` is only set for S3-compatible providers (MinIO, DigitalOcean
/// Spaces, ...); its presence switches the client to path-style addressing.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub environment: String,
    pub storage_backend: StorageBackendKind,
    pub s3: Option<S3Settings>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// Upper bound applied to every object-store call.
    pub storage_timeout: Duration,
    /// Key namespace under which all artifacts are stored.
    pub media_namespace: String,
    pub max_upload_bytes: usize,
    pub signed_url_ttl: Duration,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error> {
    match env_opt(key) {
        Some(v) => v
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", key, v)),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `DATABASE_URL` is always required. Storage settings are validated per
    /// backend: `S3_BUCKET`/`S3_REGION`/`AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`
    /// for `s3`, `LOCAL_STORAGE_PATH`/`LOCAL_STORAGE_BASE_URL` for `local`.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url = env_opt("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required"))?;

        let storage_backend = StorageBackendKind::parse(&env_or("STORAGE_BACKEND", "s3"))?;

        let s3 = match storage_backend {
            StorageBackendKind::S3 => Some(S3Settings {
                bucket: env_opt("S3_BUCKET")
                    .ok_or_else(|| anyhow::anyhow!("S3_BUCKET is required for the s3 backend"))?,
                region: env_opt("S3_REGION")
                    .or_else(|| env_opt("AWS_REGION"))
                    .ok_or_else(|| {
                        anyhow::anyhow!("S3_REGION or AWS_REGION is required for the s3 backend")
                    })?,
                access_key_id: env_opt("AWS_ACCESS_KEY_ID").ok_or_else(|| {
                    anyhow::anyhow!("AWS_ACCESS_KEY_ID is required for the s3 backend")
                })?,
                secret_access_key: env_opt("AWS_SECRET_ACCESS_KEY").ok_or_else(|| {
                    anyhow::anyhow!("AWS_SECRET_ACCESS_KEY is required for the s3 backend")
                })?,
                endpoint: env_opt("S3_ENDPOINT"),
            }),
            StorageBackendKind::Local => None,
        };

        let local_storage_path = env_opt("LOCAL_STORAGE_PATH");
        let local_storage_base_url = env_opt("LOCAL_STORAGE_BASE_URL");
        if storage_backend == StorageBackendKind::Local
            && (local_storage_path.is_none() || local_storage_base_url.is_none())
        {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL are required for the local backend"
            ));
        }

        Ok(Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            database_url,
            environment: env_or("ENVIRONMENT", "development"),
            storage_backend,
            s3,
            local_storage_path,
            local_storage_base_url,
            storage_timeout: Duration::from_secs(env_parse(
                "STORAGE_TIMEOUT_SECS",
                DEFAULT_STORAGE_TIMEOUT_SECS,
            )?),
            media_namespace: env_or("MEDIA_NAMESPACE", DEFAULT_MEDIA_NAMESPACE),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            signed_url_ttl: Duration::from_secs(env_parse(
                "SIGNED_URL_TTL_SECS",
                DEFAULT_SIGNED_URL_TTL_SECS,
            )?),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
