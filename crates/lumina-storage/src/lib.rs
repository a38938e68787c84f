//! Lumina Storage Library
//!
//! Object-store abstraction and implementations for Lumina: the
//! [`ObjectStore`] trait, key addressing, and backends for S3 (and
//! S3-compatible providers) and the local filesystem.
//!
//! # Key format
//!
//! Every artifact is addressed by a [`MediaKey`] of the form
//! `{namespace}/{entity_id}/{filename}`. Keys are produced only by the `keys`
//! module — never hand-assembled — and are immutable for the life of the
//! artifact they name: an artifact is created once and deleted once, never
//! renamed. Each stored artifact receives its own freshly generated entity
//! id, so sibling artifacts (an original and its thumbnail) do not share a
//! prefix and are only discoverable through the metadata store.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod mime;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_object_store;
pub use keys::MediaKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3Store;
pub use traits::{HeadInfo, ObjectStore, StorageError, StorageResult, DEFAULT_SIGNED_URL_TTL};
