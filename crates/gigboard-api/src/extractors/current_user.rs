//! `CurrentUser` extractor: the caller identity supplied by the auth layer.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gigboard_core::error::AppError;
use gigboard_core::types::UserId;

use crate::error::ApiError;

/// Header the upstream auth layer sets on authenticated requests.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::authentication("Missing user identity"))?;

        let user_id = raw
            .parse::<UserId>()
            .map_err(|_| AppError::authentication("Invalid user identity"))?;

        Ok(CurrentUser(user_id))
    }
}
