//! `ActingUser` extractor: reads the acting user from the `X-User-Id` header.
//!
//! Authentication happens upstream of this service; the header names the
//! user a trusted front end authenticated. Whether that user exists, is
//! banned, or holds the needed role is decided by the hub per operation.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use modhub_core::error::AppError;
use modhub_core::types::UserId;
use modhub_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the acting user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extracted acting-user context available in handlers.
#[derive(Debug, Clone)]
pub struct ActingUser(pub RequestContext);

impl ActingUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for ActingUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authorization("Missing X-User-Id header"))?;

        let user_id: UserId = raw
            .trim()
            .parse()
            .map_err(|_| AppError::validation("Invalid X-User-Id header"))?;

        Ok(ActingUser(RequestContext::new(user_id)))
    }
}
