//! Link review state: per-link checks and the messages waiting on them.

use std::collections::HashSet;

use chrono::Utc;
use dashmap::DashMap;

use modhub_core::error::AppError;
use modhub_core::types::{MessageId, UrlCheckId, UserId};
use modhub_entity::file::ScanReport;
use modhub_entity::url_check::{UrlCheck, UrlStatus};
use modhub_entity::user::User;

/// A message held back until its links are vetted.
#[derive(Debug, Clone)]
pub struct HeldMessage {
    /// Id the message is published under.
    pub message_id: MessageId,
    /// Author.
    pub user_id: UserId,
    /// Trimmed message text.
    pub text: String,
    /// Whether the content scanner flagged sensitive data.
    pub flagged: bool,
    /// Checks that still have to be marked safe.
    pub awaiting: HashSet<UrlCheckId>,
}

/// Result of clearing one check from a held message.
#[derive(Debug)]
pub enum Release {
    /// That was the last check; the message is ready to publish.
    Publish(HeldMessage),
    /// Other checks are still open.
    Waiting,
    /// The message was already published or dropped.
    Gone,
}

/// Link checks and held messages.
///
/// Each check and each held message is mutated under its own map entry,
/// so two reviews of the same link settle it exactly once and a held
/// message is released exactly once.
#[derive(Debug, Default)]
pub struct LinkRegistry {
    /// Link checks by id.
    checks: DashMap<UrlCheckId, UrlCheck>,
    /// Held messages by the id they will be published under.
    held: DashMap<MessageId, HeldMessage>,
}

impl LinkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest reviewed status of `url`, if any check for it was reviewed.
    pub fn reputation(&self, url: &str) -> Option<UrlStatus> {
        self.checks
            .iter()
            .filter(|c| c.url == url && c.is_reviewed)
            .max_by_key(|c| c.reviewed_at)
            .map(|c| c.status)
    }

    /// Holds a message back and opens one pending check per link.
    pub fn hold(
        &self,
        author: &User,
        text: &str,
        flagged: bool,
        urls: &[String],
    ) -> (MessageId, Vec<UrlCheck>) {
        let message_id = MessageId::new();
        let now = Utc::now();
        let checks: Vec<UrlCheck> = urls
            .iter()
            .map(|url| UrlCheck {
                id: UrlCheckId::new(),
                url: url.clone(),
                message_id,
                user_id: author.id,
                username: author.username.clone(),
                display_name: author.display_name.clone(),
                message_text: text.to_string(),
                status: UrlStatus::Pending,
                scan: None,
                is_reviewed: false,
                reviewed_by: None,
                created_at: now,
                reviewed_at: None,
            })
            .collect();

        self.held.insert(
            message_id,
            HeldMessage {
                message_id,
                user_id: author.id,
                text: text.to_string(),
                flagged,
                awaiting: checks.iter().map(|c| c.id).collect(),
            },
        );
        for check in &checks {
            self.checks.insert(check.id, check.clone());
        }
        (message_id, checks)
    }

    /// Looks up a check.
    pub fn get(&self, id: &UrlCheckId) -> Result<UrlCheck, AppError> {
        self.checks
            .get(id)
            .map(|c| c.clone())
            .ok_or_else(|| AppError::not_found(format!("Link check {id} not found")))
    }

    /// Checks matching `status` (all when `None`), newest first.
    pub fn list(&self, status: Option<UrlStatus>) -> Vec<UrlCheck> {
        let mut checks: Vec<UrlCheck> = self
            .checks
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .map(|c| c.clone())
            .collect();
        checks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        checks
    }

    /// Moves every open check for `url` to `status`.
    ///
    /// Checks already safe or malicious are left alone. Returns the checks
    /// that changed.
    pub fn settle(
        &self,
        url: &str,
        status: UrlStatus,
        report: Option<&ScanReport>,
        reviewer: Option<UserId>,
    ) -> Vec<UrlCheck> {
        let now = Utc::now();
        let mut changed = Vec::new();
        for mut check in self.checks.iter_mut() {
            if check.url != url || check.status.is_final() {
                continue;
            }
            check.status = status;
            check.is_reviewed = status != UrlStatus::Pending;
            check.reviewed_at = Some(now);
            if let Some(report) = report {
                check.scan = Some(report.clone());
            }
            if reviewer.is_some() {
                check.reviewed_by = reviewer;
            }
            changed.push(check.clone());
        }
        changed
    }

    /// Attaches an inconclusive scan to one open check.
    pub fn annotate(&self, id: &UrlCheckId, report: ScanReport) -> Result<UrlCheck, AppError> {
        let mut check = self
            .checks
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Link check {id} not found")))?;
        if check.status.is_final() {
            return Err(AppError::conflict(format!(
                "Link check {id} is already {}",
                check.status
            )));
        }
        check.scan = Some(report);
        Ok(check.clone())
    }

    /// Clears `check_id` from its held message.
    pub fn release(&self, message_id: &MessageId, check_id: &UrlCheckId) -> Release {
        match self.held.get_mut(message_id) {
            None => return Release::Gone,
            Some(mut held) => {
                held.awaiting.remove(check_id);
                if !held.awaiting.is_empty() {
                    return Release::Waiting;
                }
            }
        }
        match self
            .held
            .remove_if(message_id, |_, held| held.awaiting.is_empty())
        {
            Some((_, held)) => Release::Publish(held),
            None => Release::Gone,
        }
    }

    /// Drops a held message for good.
    pub fn discard(&self, message_id: &MessageId) -> Option<HeldMessage> {
        self.held.remove(message_id).map(|(_, held)| held)
    }

    /// Number of messages waiting on link review.
    pub fn held_count(&self) -> usize {
        self.held.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modhub_entity::user::UserRole;

    fn author() -> User {
        User::new("alice", "Alice", UserRole::Member)
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_message_publishes_after_last_link_clears() {
        let registry = LinkRegistry::new();
        let (message_id, checks) =
            registry.hold(&author(), "see a and b", false, &urls(&["https://a.io", "https://b.io"]));
        assert_eq!(checks.len(), 2);
        assert_eq!(registry.list(Some(UrlStatus::Pending)).len(), 2);

        assert!(matches!(registry.release(&message_id, &checks[0].id), Release::Waiting));
        match registry.release(&message_id, &checks[1].id) {
            Release::Publish(held) => assert_eq!(held.text, "see a and b"),
            other => panic!("expected publish, got {other:?}"),
        }
        assert!(matches!(registry.release(&message_id, &checks[1].id), Release::Gone));
        assert_eq!(registry.held_count(), 0);
    }

    #[test]
    fn test_settle_touches_open_checks_of_one_link_only() {
        let registry = LinkRegistry::new();
        let reviewer = UserId::new();
        registry.hold(&author(), "one", false, &urls(&["https://a.io"]));
        registry.hold(&author(), "two", false, &urls(&["https://a.io", "https://b.io"]));

        let changed = registry.settle("https://a.io", UrlStatus::Safe, None, Some(reviewer));
        assert_eq!(changed.len(), 2);
        assert!(changed.iter().all(|c| c.is_reviewed && c.reviewed_by == Some(reviewer)));
        assert_eq!(registry.reputation("https://a.io"), Some(UrlStatus::Safe));
        assert_eq!(registry.reputation("https://b.io"), None);

        assert!(registry
            .settle("https://a.io", UrlStatus::Malicious, None, Some(reviewer))
            .is_empty());
        assert_eq!(registry.reputation("https://a.io"), Some(UrlStatus::Safe));
    }

    #[test]
    fn test_suspicious_is_reviewed_but_not_final() {
        let registry = LinkRegistry::new();
        let (_, checks) = registry.hold(&author(), "x", false, &urls(&["https://c.io"]));
        let report = ScanReport::from_counts("stub", 0, 2, 0, 60);
        registry.settle("https://c.io", UrlStatus::Suspicious, Some(&report), None);
        assert_eq!(registry.reputation("https://c.io"), Some(UrlStatus::Suspicious));

        let settled = registry.settle("https://c.io", UrlStatus::Malicious, None, None);
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].id, checks[0].id);
        assert!(settled[0].scan.is_some());
        assert!(registry.annotate(&checks[0].id, report).is_err());
    }
}
