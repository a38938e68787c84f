//! Authenticated user identity.
//!
//! Authentication itself lives outside this service; the gateway in front of
//! it injects the caller's identity in the `x-user-id` header. This
//! extractor is the only place that header is read.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use lumina_core::AppError;

use crate::error::HttpAppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Missing authenticated user identity".to_string(),
                ))
            })?;

        Ok(UserContext {
            user_id: user_id.to_string(),
        })
    }
}
