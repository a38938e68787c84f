//! Deletion orchestration.

mod service;

pub use service::DeletionService;
