//! Upload validation gate.
//!
//! Runs before any I/O, in fixed order: group set, content type, byte
//! length. The first failing check short-circuits, so no partial work ever
//! happens for a rejected request. No side effects.

use lumina_core::models::UploadRequest;
use lumina_core::AppError;

/// Maximum accepted payload size.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Content types the pipeline accepts. Declared type only; the thumbnail
/// deriver is the stage that discovers undecodable payloads.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Validation gate errors
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("At least one group id is required")]
    GroupsRequired,

    #[error("Unsupported content type: {0}")]
    InvalidType(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("File is empty")]
    EmptyFile,
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::GroupsRequired => AppError::GroupsRequired,
            GateError::InvalidType(ct) => AppError::InvalidType(ct),
            GateError::TooLarge { size, max } => AppError::TooLarge { size, max },
            GateError::EmptyFile => AppError::EmptyFile,
        }
    }
}

/// Upload request validator
#[derive(Debug, Clone)]
pub struct UploadGate {
    max_bytes: usize,
}

impl UploadGate {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Validate an upload request. Checks run in fixed order and the first
    /// failure wins: group set, then content type, then size.
    pub fn validate(&self, request: &UploadRequest) -> Result<(), GateError> {
        self.validate_groups(&request.group_ids)?;
        self.validate_content_type(&request.content_type)?;
        self.validate_size(request.data.len())?;
        Ok(())
    }

    fn validate_groups(&self, group_ids: &[String]) -> Result<(), GateError> {
        if group_ids.is_empty() {
            return Err(GateError::GroupsRequired);
        }
        Ok(())
    }

    fn validate_content_type(&self, content_type: &str) -> Result<(), GateError> {
        let normalized = content_type.trim().to_lowercase();
        if !ALLOWED_CONTENT_TYPES.contains(&normalized.as_str()) {
            return Err(GateError::InvalidType(content_type.to_string()));
        }
        Ok(())
    }

    fn validate_size(&self, size: usize) -> Result<(), GateError> {
        if size == 0 {
            return Err(GateError::EmptyFile);
        }
        if size > self.max_bytes {
            return Err(GateError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

impl Default for UploadGate {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_BYTES)
    }
}
