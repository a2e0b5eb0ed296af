//! Handler-side extractor for the authenticated user

use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::auth::CurrentUser;
use crate::utils::AppError;

/// Pull the [`CurrentUser`] placed in request extensions by `require_auth`.
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> AppResult<Json<...>> { ... }
/// ```
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
