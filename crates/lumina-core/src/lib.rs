//! Lumina core library
//!
//! Shared foundations for the Lumina media service: configuration loaded from
//! the environment, the unified [`AppError`] type with its [`ErrorMetadata`]
//! contract, and the domain models (image records, upload requests, API
//! response shapes).

pub mod config;
pub mod error;
pub mod models;

pub use config::{Config, S3Settings, StorageBackendKind};
pub use error::{AppError, ErrorMetadata, LogLevel};
