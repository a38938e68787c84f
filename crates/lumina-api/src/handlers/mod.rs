//! HTTP handlers.

pub mod image_delete;
pub mod image_download;
pub mod image_get;
pub mod image_update;
pub mod image_upload;
pub mod signed_url;
