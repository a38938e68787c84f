//! Transient upload request model.

/// A fully decoded upload request.
///
/// Produced by the strict multipart decode step at the HTTP boundary and
/// consumed by a single pipeline run; it never outlives the request. Anything
/// non-conforming is rejected at decode time, so the pipeline never sees
/// optional or stringly-typed fields.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Raw file bytes as received.
    pub data: Vec<u8>,
    /// Content type declared by the client (not sniffed).
    pub content_type: String,
    /// Sanitized original filename.
    pub filename: String,
    pub title: Option<String>,
    pub tag_ids: Vec<String>,
    pub group_ids: Vec<String>,
    /// Owner, injected by the authentication layer.
    pub user_id: String,
}
