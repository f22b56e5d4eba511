//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use modhub_core::error::AppError;
use modhub_core::types::UserId;
use modhub_entity::url_check::UrlStatus;
use modhub_entity::user::UserRole;

/// Register a member.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    /// Login name.
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,
    /// Name shown to other users. Defaults to the username.
    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: Option<String>,
}

/// Send a chat message over REST.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Message body.
    #[validate(length(min = 1, message = "Message text is required"))]
    pub text: String,
}

/// Change a user's role (super-admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    /// New role.
    pub role: UserRole,
}

/// `GET /api/messages` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Page size.
    pub limit: Option<usize>,
}

/// `POST /api/files/upload` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadQuery {
    /// `manual` (default) or `automated`.
    pub moderation_mode: Option<String>,
}

/// `GET /api/violations` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViolationQuery {
    /// Filter by review state.
    pub reviewed: Option<bool>,
}

/// `GET /api/url-checks` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlCheckQuery {
    /// Filter by review state.
    pub status: Option<UrlStatus>,
}

/// `GET /ws` query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsQuery {
    /// Existing, non-banned user opening the session.
    pub user_id: UserId,
}

/// Runs `validator` rules and maps failures to a validation error.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rules() {
        let ok = RegisterUserRequest {
            username: "alice".into(),
            display_name: None,
        };
        assert!(validate_body(&ok).is_ok());

        let short = RegisterUserRequest {
            username: "al".into(),
            display_name: Some("Alice".into()),
        };
        assert!(validate_body(&short).is_err());

        let blank_display = RegisterUserRequest {
            username: "alice".into(),
            display_name: Some(String::new()),
        };
        assert!(validate_body(&blank_display).is_err());
    }

    #[test]
    fn test_message_request_requires_text() {
        let empty = SendMessageRequest { text: String::new() };
        assert!(validate_body(&empty).is_err());
    }
}
