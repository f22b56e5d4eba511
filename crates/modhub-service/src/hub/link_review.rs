//! Link review: admin decisions and reputation scans for held messages.

use std::time::Duration;

use tracing::{debug, info, warn};

use modhub_core::error::{AppError, ErrorKind};
use modhub_core::types::{UrlCheckId, UserId};
use modhub_entity::file::{ScanReport, ScanVerdict};
use modhub_entity::url_check::{UrlCheck, UrlStatus};
use modhub_realtime::OutboundMessage;

use super::Hub;
use crate::context::RequestContext;
use crate::links::{HeldMessage, Release};
use crate::rbac::SystemPermission;

/// An admin's call on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlDecision {
    /// Publish messages that link here.
    Safe,
    /// Drop messages that link here and refuse future ones.
    Malicious,
}

impl From<UrlDecision> for UrlStatus {
    fn from(decision: UrlDecision) -> Self {
        match decision {
            UrlDecision::Safe => UrlStatus::Safe,
            UrlDecision::Malicious => UrlStatus::Malicious,
        }
    }
}

impl Hub {
    /// Link checks still waiting for a final decision, newest first.
    pub fn pending_url_checks(&self, ctx: &RequestContext) -> Result<Vec<UrlCheck>, AppError> {
        self.authorized_user(ctx, SystemPermission::UrlModerate)?;
        let mut checks = self.links.list(None);
        checks.retain(|c| !c.status.is_final());
        Ok(checks)
    }

    /// Link checks filtered by `status`, newest first.
    pub fn url_checks(
        &self,
        ctx: &RequestContext,
        status: Option<UrlStatus>,
    ) -> Result<Vec<UrlCheck>, AppError> {
        self.authorized_user(ctx, SystemPermission::UrlModerate)?;
        Ok(self.links.list(status))
    }

    /// Records an admin decision for the link behind `check_id`.
    ///
    /// The decision covers every open check for the same link. A check
    /// that is already safe or malicious is a `Conflict`.
    pub async fn review_url(
        &self,
        ctx: &RequestContext,
        check_id: &UrlCheckId,
        decision: UrlDecision,
    ) -> Result<UrlCheck, AppError> {
        let admin = self.authorized_user(ctx, SystemPermission::UrlModerate)?;
        let check = self.links.get(check_id)?;
        if check.status.is_final() {
            return Err(AppError::conflict(format!(
                "Link check {check_id} is already {}",
                check.status
            )));
        }

        let changed = self
            .settle_url(&check.url, decision.into(), None, Some(admin.id))
            .await;
        let reviewed = changed
            .into_iter()
            .find(|c| c.id == *check_id)
            .ok_or_else(|| AppError::conflict(format!("Link check {check_id} was already reviewed")))?;

        info!(
            target: "audit",
            check_id = %check_id,
            url = %reviewed.url,
            status = %reviewed.status,
            reviewed_by = %admin.id,
            "Link reviewed"
        );
        Ok(reviewed)
    }

    /// Marks the link behind `check_id` safe.
    pub async fn mark_url_safe(
        &self,
        ctx: &RequestContext,
        check_id: &UrlCheckId,
    ) -> Result<UrlCheck, AppError> {
        self.review_url(ctx, check_id, UrlDecision::Safe).await
    }

    /// Marks the link behind `check_id` malicious.
    pub async fn mark_url_malicious(
        &self,
        ctx: &RequestContext,
        check_id: &UrlCheckId,
    ) -> Result<UrlCheck, AppError> {
        self.review_url(ctx, check_id, UrlDecision::Malicious).await
    }

    /// Runs a reputation scan for the link behind `check_id`.
    ///
    /// Clean and malicious verdicts settle the link like an admin decision.
    /// A suspicious verdict is recorded but leaves the final call to an
    /// admin, and an unknown one only attaches the report. Scanner failures
    /// and timeouts leave the check untouched and return
    /// `UpstreamUnavailable`.
    pub async fn scan_url_check(
        &self,
        ctx: &RequestContext,
        check_id: &UrlCheckId,
    ) -> Result<UrlCheck, AppError> {
        self.authorized_user(ctx, SystemPermission::UrlModerate)?;
        let check = self.links.get(check_id)?;
        if check.status.is_final() {
            return Err(AppError::conflict(format!(
                "Link check {check_id} is already {}",
                check.status
            )));
        }

        let report = self.scan_link(&check.url).await?;
        let status = match report.verdict {
            ScanVerdict::Clean => UrlStatus::Safe,
            ScanVerdict::Malicious => UrlStatus::Malicious,
            ScanVerdict::Suspicious => UrlStatus::Suspicious,
            ScanVerdict::Unknown => {
                debug!(check_id = %check_id, url = %check.url, "Link unknown to scanner");
                return self.links.annotate(check_id, report);
            }
        };

        info!(
            target: "audit",
            check_id = %check_id,
            url = %check.url,
            scanner = self.url_scanner.name(),
            verdict = ?report.verdict,
            "Link scanned"
        );
        let changed = self.settle_url(&check.url, status, Some(&report), None).await;
        match changed.into_iter().find(|c| c.id == *check_id) {
            Some(updated) => Ok(updated),
            None => self.links.get(check_id),
        }
    }

    /// Bounded call into the link scanner.
    async fn scan_link(&self, url: &str) -> Result<ScanReport, AppError> {
        let bound = Duration::from_secs(self.config.scan_timeout_seconds.max(1));
        match tokio::time::timeout(bound, self.url_scanner.scan_url(url)).await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(err)) if err.kind == ErrorKind::UpstreamUnavailable => Err(err),
            Ok(Err(err)) => Err(AppError::upstream_unavailable(format!(
                "{} link scan failed: {}",
                self.url_scanner.name(),
                err.message
            ))),
            Err(_) => Err(AppError::upstream_unavailable(format!(
                "{} link scan timed out after {}s",
                self.url_scanner.name(),
                bound.as_secs()
            ))),
        }
    }

    /// Applies `status` to every open check of `url` and acts on the held
    /// messages behind them.
    async fn settle_url(
        &self,
        url: &str,
        status: UrlStatus,
        report: Option<&ScanReport>,
        reviewer: Option<UserId>,
    ) -> Vec<UrlCheck> {
        let changed = self.links.settle(url, status, report, reviewer);
        for check in &changed {
            match status {
                UrlStatus::Safe => {
                    if let Release::Publish(held) = self.links.release(&check.message_id, &check.id)
                    {
                        self.publish_held(held).await;
                    }
                }
                UrlStatus::Malicious => {
                    if let Some(held) = self.links.discard(&check.message_id) {
                        info!(
                            target: "audit",
                            message_id = %held.message_id,
                            user_id = %held.user_id,
                            url,
                            "Held message dropped for malicious link"
                        );
                        self.sessions.send_to_user(
                            &held.user_id,
                            &OutboundMessage::warning(format!(
                                "Your message was not published: it links to a blocked site ({url})."
                            )),
                        );
                    }
                }
                UrlStatus::Suspicious | UrlStatus::Pending => {}
            }
        }
        if status == UrlStatus::Suspicious && !changed.is_empty() {
            self.notify_admins(&OutboundMessage::warning(format!(
                "Link {url} looks suspicious and needs a decision"
            )));
        }
        changed
    }

    /// Publishes a held message whose links are all safe, unless its author
    /// has since been banned or removed.
    async fn publish_held(&self, held: HeldMessage) {
        let author = match self.active_user(&held.user_id) {
            Ok(author) => author,
            Err(_) => {
                warn!(
                    message_id = %held.message_id,
                    user_id = %held.user_id,
                    "Held message dropped; author no longer active"
                );
                return;
            }
        };
        let message = self
            .deliver(&author, held.message_id, &held.text, held.flagged)
            .await;
        info!(
            target: "audit",
            message_id = %message.id,
            user_id = %author.id,
            "Held message published"
        );
        self.sessions.send_to_user(
            &author.id,
            &OutboundMessage::info("Your message with links was approved and published."),
        );
    }
}
