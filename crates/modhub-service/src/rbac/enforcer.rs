//! RBAC enforcement: permission checks and the moderation hierarchy.

use modhub_core::error::AppError;
use modhub_entity::user::{User, UserRole};

use super::policies::{RbacPolicies, SystemPermission};

/// Enforces role-based access control for moderation operations.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    /// The policy configuration.
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates a new enforcer with the default policy set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether the given role has the required permission.
    pub fn require_permission(
        &self,
        role: &UserRole,
        permission: &SystemPermission,
    ) -> Result<(), AppError> {
        if self.policies.has_permission(role, permission) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Role '{role}' does not have permission '{permission:?}'"
            )))
        }
    }

    /// Checks whether the role has the required permission (returns bool).
    pub fn has_permission(&self, role: &UserRole, permission: &SystemPermission) -> bool {
        self.policies.has_permission(role, permission)
    }

    /// Checks that `actor` may ban, unban, or reset `target`.
    ///
    /// Admins act on members only; the super-admin acts on anyone below it.
    /// Nobody moderates themselves.
    pub fn require_can_moderate(&self, actor: &User, target: &User) -> Result<(), AppError> {
        self.require_permission(&actor.role, &SystemPermission::UserModerate)?;
        if actor.id == target.id {
            return Err(AppError::authorization("Cannot moderate your own account"));
        }
        if actor.role.privilege_level() <= target.role.privilege_level() {
            return Err(AppError::authorization(format!(
                "Role '{}' cannot act on role '{}'",
                actor.role, target.role
            )));
        }
        Ok(())
    }

    /// Checks that `actor` may change `target`'s role to `new_role`.
    ///
    /// Only the super-admin changes roles, the super-admin itself can never
    /// be demoted, and nobody can be promoted to super-admin.
    pub fn require_can_change_role(
        &self,
        actor: &User,
        target: &User,
        new_role: UserRole,
    ) -> Result<(), AppError> {
        self.require_permission(&actor.role, &SystemPermission::UserChangeRole)?;
        if target.role.is_super_admin() {
            return Err(AppError::authorization("The super-admin role cannot be changed"));
        }
        if new_role.is_super_admin() {
            return Err(AppError::authorization("Cannot grant the super-admin role"));
        }
        Ok(())
    }
}
