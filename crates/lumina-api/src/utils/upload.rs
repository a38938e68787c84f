//! Strict multipart decoding.
//!
//! One decode step at the boundary turns the multipart form into a fixed
//! [`UploadRequest`] value. Anything non-conforming (no file, two files, an
//! unknown field, a missing content type) is rejected here, so the pipeline
//! never threads optional or stringly-typed values around.

use axum::extract::multipart::{Field, Multipart};
use lumina_core::models::UploadRequest;
use lumina_core::AppError;

/// Sanitize a client-supplied filename: basename only, bounded length,
/// conservative character set.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let path = std::path::Path::new(filename);
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "invalid_filename".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim().is_empty() || s.len() < 3 {
        "file".to_string()
    } else {
        s
    }
}

async fn text_value(field: Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read field {}: {}", name, e)))
        .map(|value| value.trim().to_string())
}

/// Decode a multipart form into an [`UploadRequest`].
///
/// Expected fields: exactly one `file`, optional `title`, repeated `tags`,
/// repeated `group_ids`. The group-set emptiness itself is checked by the
/// validation gate (so its error ordering holds); everything structural is
/// rejected here.
pub async fn decode_upload(
    mut multipart: Multipart,
    user_id: String,
) -> Result<UploadRequest, AppError> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut title: Option<String> = None;
    let mut tag_ids: Vec<String> = Vec::new();
    let mut group_ids: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Exactly one file field is allowed".to_string(),
                    ));
                }
                let filename = sanitize_filename(field.file_name().unwrap_or("file"));
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::InvalidInput(
                            "File field is missing a content type".to_string(),
                        )
                    })?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::InvalidInput(format!("Failed to read file field: {}", e))
                    })?
                    .to_vec();
                file = Some((data, filename, content_type));
            }
            Some("title") => {
                let value = text_value(field, "title").await?;
                if !value.is_empty() {
                    title = Some(value);
                }
            }
            Some("tags") => {
                let value = text_value(field, "tags").await?;
                if value.is_empty() {
                    return Err(AppError::InvalidInput("Empty tag id".to_string()));
                }
                tag_ids.push(value);
            }
            Some("group_ids") => {
                let value = text_value(field, "group_ids").await?;
                if value.is_empty() {
                    return Err(AppError::InvalidInput("Empty group id".to_string()));
                }
                group_ids.push(value);
            }
            other => {
                return Err(AppError::InvalidInput(format!(
                    "Unexpected multipart field: {:?}",
                    other.unwrap_or("<unnamed>")
                )));
            }
        }
    }

    let (data, filename, content_type) = file.ok_or(AppError::MissingFile)?;

    Ok(UploadRequest {
        data,
        content_type,
        filename,
        title,
        tag_ids,
        group_ids,
        user_id,
    })
}
