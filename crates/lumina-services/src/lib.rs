//! Lumina Services Library
//!
//! Request-scoped orchestrators over the object store and the metadata
//! store: the upload saga (validate → derive → dual store → record, with
//! compensation for every partial failure) and the deletion flow
//! (best-effort artifact cleanup, authoritative metadata removal). Also the
//! access-URL issuance helpers and in-memory test doubles.

pub mod delete;
pub mod test_helpers;
pub mod upload;
pub mod urls;

pub use delete::DeletionService;
pub use upload::UploadPipeline;
