//! Application state.

use std::sync::Arc;

use lumina_core::Config;
use lumina_db::RecordStore;
use lumina_processing::UploadGate;
use lumina_services::{DeletionService, UploadPipeline};
use lumina_storage::ObjectStore;

/// Shared application state.
///
/// The store handles are the only state shared across requests; both are
/// injected explicitly (no ambient singletons) and safe for concurrent use.
pub struct AppState {
    pub config: Config,
    pub objects: Arc<dyn ObjectStore>,
    pub records: Arc<dyn RecordStore>,
    pub uploads: UploadPipeline,
    pub deletions: DeletionService,
}

impl AppState {
    pub fn new(
        config: Config,
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        let uploads = UploadPipeline::new(
            objects.clone(),
            records.clone(),
            UploadGate::new(config.max_upload_bytes),
            config.media_namespace.clone(),
        );
        let deletions = DeletionService::new(objects.clone(), records.clone());

        Self {
            config,
            objects,
            records,
            uploads,
            deletions,
        }
    }
}
