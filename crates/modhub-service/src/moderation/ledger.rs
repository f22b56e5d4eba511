//! Violation ledger: per-user counters, audit trail, and the ban threshold.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{info, warn};

use modhub_core::config::ModerationConfig;
use modhub_core::error::AppError;
use modhub_core::types::{UserId, ViolationId};
use modhub_entity::user::User;
use modhub_entity::violation::{MatchedTerm, Violation};
use modhub_realtime::message::types::AdminNotificationKind;

use crate::rbac::{RbacEnforcer, SystemPermission};
use crate::user::UserDirectory;

/// Result of recording one violation.
#[derive(Debug, Clone)]
pub struct ViolationRecord {
    /// The stored audit entry.
    pub violation: Violation,
    /// The user after the increment.
    pub user: User,
    /// Counter value after the increment.
    pub new_count: u32,
    /// Whether this increment is the one that reached the ban threshold.
    pub crossed_threshold: bool,
    /// Admin alert due for this increment, if any.
    pub alert: Option<AdminNotificationKind>,
}

/// Durable per-user violation counter plus audit trail.
///
/// The counter and the audit entry are written while the user's directory
/// entry is locked, so rapid concurrent violations from one user cannot
/// skip past the threshold or both observe the crossing.
#[derive(Debug)]
pub struct ViolationLedger {
    /// User directory (owner of the counter and ban flag).
    directory: Arc<UserDirectory>,
    /// Violation ID → audit entry.
    violations: DashMap<ViolationId, Violation>,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
    /// Count at which members are banned.
    threshold: u32,
    /// Admins are alerted on every n-th violation.
    alert_interval: u32,
}

impl ViolationLedger {
    /// Creates a ledger over `directory`.
    pub fn new(
        directory: Arc<UserDirectory>,
        rbac: Arc<RbacEnforcer>,
        config: &ModerationConfig,
    ) -> Self {
        Self {
            directory,
            violations: DashMap::new(),
            rbac,
            threshold: config.ban_threshold.max(1),
            alert_interval: config.admin_alert_interval,
        }
    }

    /// The configured ban threshold.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Atomically increments the user's counter and appends an audit entry.
    ///
    /// A crossing is reported only for the increment that moves the counter
    /// from below the threshold to the threshold, and only for non-admins.
    /// That increment also sets the ban flag.
    pub fn record_violation(
        &self,
        user_id: &UserId,
        message_text: &str,
        matched_terms: Vec<MatchedTerm>,
    ) -> Result<ViolationRecord, AppError> {
        let threshold = self.threshold;
        let ((violation, crossed), user) = self.directory.update(user_id, |user| {
            let previous = user.violation_count;
            user.violation_count = previous.saturating_add(1);
            user.last_violation_at = Some(Utc::now());

            let crossed = !user.is_admin()
                && previous < threshold
                && user.violation_count >= threshold;
            if crossed {
                user.is_banned = true;
            }

            let violation = Violation {
                id: ViolationId::new(),
                user_id: user.id,
                username: user.username.clone(),
                display_name: user.display_name.clone(),
                message_text: message_text.to_string(),
                matched_terms,
                is_reviewed: false,
                created_at: Utc::now(),
            };
            self.violations.insert(violation.id, violation.clone());
            Ok((violation, crossed))
        })?;

        let new_count = user.violation_count;
        let alert = if crossed {
            Some(AdminNotificationKind::UserBanned)
        } else if self.alert_interval > 0 && new_count % self.alert_interval == 0 {
            Some(AdminNotificationKind::ViolationWarning)
        } else {
            None
        };

        info!(
            target: "audit",
            user_id = %user.id,
            username = %user.username,
            violation_id = %violation.id,
            violation_count = new_count,
            threshold,
            crossed,
            "Violation recorded"
        );
        if crossed {
            warn!(target: "audit", user_id = %user.id, username = %user.username, "User auto-banned");
        }

        Ok(ViolationRecord {
            violation,
            user,
            new_count,
            crossed_threshold: crossed,
            alert,
        })
    }

    /// Zeroes `target`'s counter. Audit entries are kept.
    pub fn reset_violations(&self, actor_id: &UserId, target_id: &UserId) -> Result<User, AppError> {
        self.authorize_moderation(actor_id, target_id)?;
        let ((), user) = self.directory.update(target_id, |user| {
            user.violation_count = 0;
            user.last_violation_at = None;
            Ok(())
        })?;
        info!(target: "audit", actor_id = %actor_id, user_id = %target_id, "Violations reset");
        Ok(user)
    }

    /// Bans `target`. Banning an already banned user is a conflict.
    pub fn ban_user(&self, actor_id: &UserId, target_id: &UserId) -> Result<User, AppError> {
        self.authorize_moderation(actor_id, target_id)?;
        let ((), user) = self.directory.update(target_id, |user| {
            if user.is_banned {
                return Err(AppError::conflict(format!(
                    "User '{}' is already banned",
                    user.username
                )));
            }
            user.is_banned = true;
            Ok(())
        })?;
        info!(target: "audit", actor_id = %actor_id, user_id = %target_id, "User banned");
        Ok(user)
    }

    /// Lifts `target`'s ban. Unbanning a user who is not banned is a conflict.
    pub fn unban_user(&self, actor_id: &UserId, target_id: &UserId) -> Result<User, AppError> {
        self.authorize_moderation(actor_id, target_id)?;
        let ((), user) = self.directory.update(target_id, |user| {
            if !user.is_banned {
                return Err(AppError::conflict(format!(
                    "User '{}' is not banned",
                    user.username
                )));
            }
            user.is_banned = false;
            Ok(())
        })?;
        info!(target: "audit", actor_id = %actor_id, user_id = %target_id, "User unbanned");
        Ok(user)
    }

    /// Marks a violation as reviewed. Reviewing twice is harmless.
    pub fn review_violation(
        &self,
        actor_id: &UserId,
        violation_id: &ViolationId,
    ) -> Result<Violation, AppError> {
        self.authorize(actor_id, SystemPermission::ViolationReview)?;
        let mut entry = self
            .violations
            .get_mut(violation_id)
            .ok_or_else(|| AppError::not_found(format!("Violation {violation_id} not found")))?;
        entry.is_reviewed = true;
        info!(target: "audit", actor_id = %actor_id, violation_id = %violation_id, "Violation reviewed");
        Ok(entry.clone())
    }

    /// Lists violations newest first, optionally filtered by review state.
    pub fn list_violations(
        &self,
        actor_id: &UserId,
        reviewed: Option<bool>,
    ) -> Result<Vec<Violation>, AppError> {
        self.authorize(actor_id, SystemPermission::ViolationReview)?;
        let mut list: Vec<Violation> = self
            .violations
            .iter()
            .filter(|e| reviewed.is_none_or(|r| e.value().is_reviewed == r))
            .map(|e| e.value().clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    /// Every audit entry for one user, regardless of resets.
    pub fn violations_for(&self, user_id: &UserId) -> Vec<Violation> {
        let mut list: Vec<Violation> = self
            .violations
            .iter()
            .filter(|e| e.value().user_id == *user_id)
            .map(|e| e.value().clone())
            .collect();
        list.sort_by_key(|v| v.created_at);
        list
    }

    /// Re-reads both users and checks the hierarchy at call time.
    fn authorize_moderation(&self, actor_id: &UserId, target_id: &UserId) -> Result<(), AppError> {
        let actor = self.active_actor(actor_id)?;
        let target = self.directory.get(target_id)?;
        self.rbac.require_can_moderate(&actor, &target)
    }

    fn authorize(&self, actor_id: &UserId, permission: SystemPermission) -> Result<User, AppError> {
        let actor = self.active_actor(actor_id)?;
        self.rbac.require_permission(&actor.role, &permission)?;
        Ok(actor)
    }

    fn active_actor(&self, actor_id: &UserId) -> Result<User, AppError> {
        let actor = self
            .directory
            .get(actor_id)
            .map_err(|_| AppError::authorization("Unknown user"))?;
        if actor.is_banned {
            return Err(AppError::authorization("Your account is banned"));
        }
        Ok(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modhub_core::ErrorKind;
    use modhub_entity::user::UserRole;

    fn setup(threshold: u32) -> (Arc<UserDirectory>, ViolationLedger) {
        let directory = Arc::new(UserDirectory::new());
        let config = ModerationConfig {
            ban_threshold: threshold,
            admin_alert_interval: 5,
            ..ModerationConfig::default()
        };
        let ledger = ViolationLedger::new(directory.clone(), Arc::new(RbacEnforcer::new()), &config);
        (directory, ledger)
    }

    fn record(ledger: &ViolationLedger, user_id: &UserId) -> ViolationRecord {
        ledger
            .record_violation(user_id, "bad words", vec![MatchedTerm::keyword("bad")])
            .expect("record")
    }

    #[test]
    fn test_crossing_fires_exactly_once() {
        let (directory, ledger) = setup(10);
        let user = directory.register("spammer", "Spammer", UserRole::Member).expect("user");

        for n in 1..=9 {
            let rec = record(&ledger, &user.id);
            assert_eq!(rec.new_count, n);
            assert!(!rec.crossed_threshold);
            assert!(!rec.user.is_banned);
        }
        let tenth = record(&ledger, &user.id);
        assert!(tenth.crossed_threshold);
        assert!(tenth.user.is_banned);
        assert_eq!(tenth.alert, Some(AdminNotificationKind::UserBanned));

        for _ in 0..5 {
            assert!(!record(&ledger, &user.id).crossed_threshold);
        }
        assert_eq!(directory.get(&user.id).expect("user").violation_count, 15);
    }

    #[test]
    fn test_alert_cadence_below_threshold() {
        let (directory, ledger) = setup(10);
        let user = directory.register("chatty", "Chatty", UserRole::Member).expect("user");
        let alerts: Vec<_> = (0..9).map(|_| record(&ledger, &user.id).alert).collect();
        assert_eq!(alerts[4], Some(AdminNotificationKind::ViolationWarning));
        assert_eq!(alerts.iter().filter(|a| a.is_some()).count(), 1);
    }

    #[test]
    fn test_admins_are_never_auto_banned() {
        let (directory, ledger) = setup(2);
        let admin = directory.register("moddy", "Moddy", UserRole::Admin).expect("admin");
        record(&ledger, &admin.id);
        let rec = record(&ledger, &admin.id);
        assert!(!rec.crossed_threshold);
        assert!(!rec.user.is_banned);
    }

    #[test]
    fn test_concurrent_increments_cross_once() {
        let (directory, ledger) = setup(10);
        let ledger = Arc::new(ledger);
        let user_id = directory.register("burst", "Burst", UserRole::Member).expect("user").id;

        let crossings: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..20)
                .map(|_| {
                    let ledger = ledger.clone();
                    scope.spawn(move || record(&ledger, &user_id).crossed_threshold)
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("thread"))
                .filter(|crossed| *crossed)
                .count()
        });

        assert_eq!(crossings, 1);
        assert_eq!(directory.get(&user_id).expect("user").violation_count, 20);
    }

    #[test]
    fn test_reset_keeps_history_and_rearms_threshold() {
        let (directory, ledger) = setup(3);
        let admin = directory.register("admin", "Admin", UserRole::Admin).expect("admin");
        let user = directory.register("member", "Member", UserRole::Member).expect("user");
        for _ in 0..2 {
            record(&ledger, &user.id);
        }
        let reset = ledger.reset_violations(&admin.id, &user.id).expect("reset");
        assert_eq!(reset.violation_count, 0);
        assert_eq!(ledger.violations_for(&user.id).len(), 2);

        for _ in 0..2 {
            assert!(!record(&ledger, &user.id).crossed_threshold);
        }
        assert!(record(&ledger, &user.id).crossed_threshold);
    }

    #[test]
    fn test_ban_conflicts_and_hierarchy() {
        let (directory, ledger) = setup(10);
        let admin = directory.register("admin", "Admin", UserRole::Admin).expect("admin");
        let other = directory.register("admin2", "Admin2", UserRole::Admin).expect("admin2");
        let user = directory.register("member", "Member", UserRole::Member).expect("user");

        ledger.ban_user(&admin.id, &user.id).expect("ban");
        let dup = ledger.ban_user(&admin.id, &user.id).expect_err("duplicate");
        assert_eq!(dup.kind, ErrorKind::Conflict);

        let denied = ledger.ban_user(&admin.id, &other.id).expect_err("peer admin");
        assert_eq!(denied.kind, ErrorKind::Authorization);

        let member_try = ledger.unban_user(&user.id, &user.id).expect_err("banned actor");
        assert_eq!(member_try.kind, ErrorKind::Authorization);

        ledger.unban_user(&admin.id, &user.id).expect("unban");
        let again = ledger.unban_user(&admin.id, &user.id).expect_err("not banned");
        assert_eq!(again.kind, ErrorKind::Conflict);
    }

    #[test]
    fn test_review_and_filter() {
        let (directory, ledger) = setup(10);
        let admin = directory.register("admin", "Admin", UserRole::Admin).expect("admin");
        let user = directory.register("member", "Member", UserRole::Member).expect("user");
        let first = record(&ledger, &user.id).violation;
        record(&ledger, &user.id);

        assert!(ledger.list_violations(&user.id, None).is_err());
        let reviewed = ledger.review_violation(&admin.id, &first.id).expect("review");
        assert!(reviewed.is_reviewed);
        assert_eq!(ledger.list_violations(&admin.id, Some(true)).expect("list").len(), 1);
        assert_eq!(ledger.list_violations(&admin.id, Some(false)).expect("list").len(), 1);
        assert_eq!(ledger.list_violations(&admin.id, None).expect("list").len(), 2);
    }
}
