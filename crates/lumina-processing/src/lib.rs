//! Lumina Processing Library
//!
//! Pre-storage stages of the upload pipeline: the validation gate that
//! rejects malformed requests before any I/O, and the thumbnail deriver.

pub mod gate;
pub mod thumbnail;

pub use gate::{GateError, UploadGate, ALLOWED_CONTENT_TYPES, MAX_UPLOAD_BYTES};
pub use thumbnail::{
    derive_thumbnail, ThumbnailError, THUMBNAIL_CONTENT_TYPE, THUMBNAIL_SIZE,
};
