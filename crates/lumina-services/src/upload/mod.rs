//! Upload orchestration.

mod rollback;
mod service;

pub use service::{UploadPipeline, UploadState};
