//! Principal extractors.
//!
//! Every protected handler declares its access requirement through one of
//! these extractors; there are no ad hoc `is_admin` checks scattered through
//! route code. The principal itself is written into the session by the
//! external identity layer.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{Principal, session_keys};

/// Extractor that requires an authenticated principal.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(principal): RequireUser) -> impl IntoResponse {
///     format!("user {}", principal.user_id)
/// }
/// ```
pub struct RequireUser(pub Principal);

/// Extractor that requires an authenticated admin principal.
///
/// Rejects with `Forbidden` when the caller is authenticated but not an
/// admin.
pub struct RequireAdmin(pub Principal);

async fn principal_from_parts(parts: &mut Parts) -> Result<Principal, AppError> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AppError::Unauthorized)?;

    session
        .get::<Principal>(session_keys::PRINCIPAL)
        .await
        .ok()
        .flatten()
        .ok_or(AppError::Unauthorized)
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(principal_from_parts(parts).await?))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = principal_from_parts(parts).await?;
        if !principal.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(Self(principal))
    }
}
