//! Role-to-permission mapping definitions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use modhub_entity::user::UserRole;

/// A system-level permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPermission {
    /// Send chat messages.
    MessageSend,
    /// Read message history.
    MessageRead,
    /// Upload files.
    FileUpload,
    /// Approve, reject, and re-scan files; see pending files.
    FileModerate,
    /// List and review violations.
    ViolationReview,
    /// Review and scan links held for moderation.
    UrlModerate,
    /// List every user.
    UserList,
    /// Ban, unban, and reset violation counters.
    UserModerate,
    /// Promote and demote admins.
    UserChangeRole,
}

/// Mapping of roles to their granted permissions.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    /// Role → permissions.
    grants: HashMap<UserRole, HashSet<SystemPermission>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        use SystemPermission::*;

        let member: HashSet<SystemPermission> =
            [MessageSend, MessageRead, FileUpload].into_iter().collect();

        let mut admin = member.clone();
        admin.extend([
            FileModerate,
            ViolationReview,
            UrlModerate,
            UserList,
            UserModerate,
        ]);

        let mut super_admin = admin.clone();
        super_admin.insert(UserChangeRole);

        let mut grants = HashMap::new();
        grants.insert(UserRole::Member, member);
        grants.insert(UserRole::Admin, admin);
        grants.insert(UserRole::SuperAdmin, super_admin);

        Self { grants }
    }

    /// Checks whether `role` holds `permission`.
    pub fn has_permission(&self, role: &UserRole, permission: &SystemPermission) -> bool {
        self.grants
            .get(role)
            .is_some_and(|perms| perms.contains(permission))
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
