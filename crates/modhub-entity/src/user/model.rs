//! User entity model.

use chrono::{DateTime, Utc};
use modhub_core::types::UserId;
use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// A registered chat participant.
///
/// The ban flag and violation counter are owned by the violation ledger;
/// the role is owned by role management. Nothing else mutates a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Role in the moderation hierarchy.
    pub role: UserRole,
    /// Whether the account is suspended.
    pub is_banned: bool,
    /// Violations recorded since the last reset.
    pub violation_count: u32,
    /// Time of the most recent violation.
    pub last_violation_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh, unbanned user with no violations.
    pub fn new(username: impl Into<String>, display_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            display_name: display_name.into(),
            role,
            is_banned: false,
            violation_count: 0,
            last_violation_at: None,
            created_at: Utc::now(),
        }
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if the user may currently act (send, upload, moderate).
    pub fn can_act(&self) -> bool {
        !self.is_banned
    }
}
