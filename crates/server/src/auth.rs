use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use utils::CALLER_ID_HEADER;
use uuid::Uuid;

use crate::error::ApiError;

/// Identity of the user performing the request, taken from the
/// `X-USER-ID` header. Extraction fails with 401 when the header is
/// missing or not a UUID.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity(pub Uuid);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(CALLER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(CallerIdentity)
            .ok_or(ApiError::Unauthorized)
    }
}
