//! Administrative operations on users and violations.

use tracing::info;

use modhub_core::error::AppError;
use modhub_core::types::{UserId, ViolationId};
use modhub_entity::user::{User, UserRole};
use modhub_entity::violation::Violation;
use modhub_realtime::OutboundMessage;

use super::Hub;
use crate::context::RequestContext;
use crate::rbac::SystemPermission;

impl Hub {
    /// The caller's own account. Banned users may read it.
    pub fn me(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.directory
            .get(&ctx.user_id)
            .map_err(|_| AppError::authorization("Unknown user"))
    }

    /// One user's record. Admins may read anyone; members only themselves.
    pub fn get_user(&self, ctx: &RequestContext, user_id: &UserId) -> Result<User, AppError> {
        if ctx.user_id == *user_id {
            return self.me(ctx);
        }
        self.authorized_user(ctx, SystemPermission::UserList)?;
        self.directory.get(user_id)
    }

    /// Every user, oldest first. Admins only.
    pub fn list_users(&self, ctx: &RequestContext) -> Result<Vec<User>, AppError> {
        self.authorized_user(ctx, SystemPermission::UserList)?;
        Ok(self.directory.list())
    }

    /// Bans `target` and pushes the new state to the target's sessions.
    pub fn ban_user(&self, ctx: &RequestContext, target: &UserId) -> Result<User, AppError> {
        let user = self.ledger.ban_user(&ctx.user_id, target)?;
        self.push_account_status(&user, "Your account has been banned by a moderator");
        Ok(user)
    }

    /// Lifts a ban. The violation counter is left untouched.
    pub fn unban_user(&self, ctx: &RequestContext, target: &UserId) -> Result<User, AppError> {
        let user = self.ledger.unban_user(&ctx.user_id, target)?;
        self.push_account_status(&user, "Your account has been restored");
        Ok(user)
    }

    /// Zeroes `target`'s violation counter. Audit entries are kept.
    pub fn reset_violations(&self, ctx: &RequestContext, target: &UserId) -> Result<User, AppError> {
        let user = self.ledger.reset_violations(&ctx.user_id, target)?;
        self.push_account_status(&user, "Your violation count has been reset");
        Ok(user)
    }

    /// Changes `target`'s role. Super-admin only; takes effect on the
    /// target's next action.
    pub fn change_role(
        &self,
        ctx: &RequestContext,
        target: &UserId,
        role: UserRole,
    ) -> Result<User, AppError> {
        let actor = self.active_user(&ctx.user_id)?;
        let current = self.directory.get(target)?;
        self.rbac.require_can_change_role(&actor, &current, role)?;

        let (previous, user) = self.directory.update(target, |user| {
            let previous = user.role;
            user.role = role;
            Ok(previous)
        })?;

        info!(
            target: "audit",
            actor_id = %actor.id,
            user_id = %user.id,
            from = %previous,
            to = %role,
            "Role changed"
        );
        if previous != role {
            self.sessions.send_to_user(
                &user.id,
                &OutboundMessage::info(format!("Your role is now {role}")),
            );
        }
        Ok(user)
    }

    /// Violations newest first, optionally filtered by review state.
    pub fn list_violations(
        &self,
        ctx: &RequestContext,
        reviewed: Option<bool>,
    ) -> Result<Vec<Violation>, AppError> {
        self.ledger.list_violations(&ctx.user_id, reviewed)
    }

    /// Every violation recorded for one user, oldest first.
    pub fn user_violations(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
    ) -> Result<Vec<Violation>, AppError> {
        self.authorized_user(ctx, SystemPermission::ViolationReview)?;
        self.directory.get(user_id)?;
        Ok(self.ledger.violations_for(user_id))
    }

    /// Marks a violation as reviewed.
    pub fn review_violation(
        &self,
        ctx: &RequestContext,
        violation_id: &ViolationId,
    ) -> Result<Violation, AppError> {
        self.ledger.review_violation(&ctx.user_id, violation_id)
    }
}
