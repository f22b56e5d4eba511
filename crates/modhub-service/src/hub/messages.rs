//! Chat message submission and history.

use chrono::Utc;
use tracing::{debug, info, warn};

use modhub_core::error::AppError;
use modhub_core::types::MessageId;
use modhub_entity::message::Message;
use modhub_entity::url_check::{UrlCheck, UrlStatus};
use modhub_entity::user::User;
use modhub_entity::violation::{MatchedTerm, TermCategory};
use modhub_realtime::OutboundMessage;
use modhub_realtime::message::builder::{build_admin_notification, build_chat_message};
use modhub_realtime::message::types::AdminNotificationKind;

use super::Hub;
use crate::context::RequestContext;
use crate::moderation::ViolationRecord;
use crate::rbac::SystemPermission;
use crate::scanner::ContentVerdict;

/// Default page size for history reads.
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Largest page size for history reads.
const MAX_HISTORY_LIMIT: usize = 500;

/// What happened to a submitted message.
#[derive(Debug, Clone)]
pub enum MessageOutcome {
    /// Accepted and broadcast. `warnings` is non-empty for soft matches.
    Delivered {
        /// The stored message.
        message: Message,
        /// Sensitive-data terms the author was warned about.
        warnings: Vec<MatchedTerm>,
    },
    /// Held until every listed link check is marked safe.
    Held(Vec<UrlCheck>),
    /// Refused by policy; a violation was recorded.
    Blocked(ViolationRecord),
    /// Refused because it links to a known-malicious site. Not a violation.
    Refused {
        /// The malicious links.
        urls: Vec<String>,
    },
}

/// A submission the hub did not refuse.
#[derive(Debug, Clone)]
pub enum Accepted {
    /// Delivered right away.
    Delivered(Message),
    /// Waiting on link review.
    Held(Vec<UrlCheck>),
}

impl Accepted {
    /// The delivered message, if it was delivered right away.
    pub fn delivered(self) -> Option<Message> {
        match self {
            Self::Delivered(message) => Some(message),
            Self::Held(_) => None,
        }
    }
}

impl MessageOutcome {
    /// Converts refusals into `PolicyViolation` errors.
    pub fn into_result(self) -> Result<Accepted, AppError> {
        match self {
            Self::Delivered { message, .. } => Ok(Accepted::Delivered(message)),
            Self::Held(checks) => Ok(Accepted::Held(checks)),
            Self::Blocked(record) => Err(AppError::policy_violation(blocked_notice(
                &record.violation.matched_terms,
                record.new_count,
                record.crossed_threshold,
            ))),
            Self::Refused { urls } => Err(AppError::policy_violation(refused_notice(&urls))),
        }
    }
}

impl Hub {
    /// Evaluates and delivers one chat message.
    ///
    /// Allowed and soft-matched messages are appended to history and
    /// broadcast to every non-banned session, including the author's own.
    /// Blocked messages are never broadcast: the violation is recorded,
    /// the originating session gets a `POLICY_VIOLATION` error frame (plus
    /// a `warning` when sensitive data was also found), and admins are
    /// alerted when the ledger says so. Messages with links are delivered
    /// only when every link is known safe, refused when one is known
    /// malicious, and held for review otherwise.
    pub async fn submit_message(
        &self,
        ctx: &RequestContext,
        text: &str,
    ) -> Result<MessageOutcome, AppError> {
        let author = self.authorized_user(ctx, SystemPermission::MessageSend)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Message text is empty"));
        }
        let length = text.chars().count();
        if length > self.config.max_message_length {
            return Err(AppError::validation(format!(
                "Message is {length} characters; the limit is {}",
                self.config.max_message_length
            )));
        }

        match self.content_scanner.scan(text).await? {
            ContentVerdict::Blocked(terms) => {
                let record = self.ledger.record_violation(&author.id, text, terms)?;
                self.announce_violation(ctx, &record);
                Ok(MessageOutcome::Blocked(record))
            }
            ContentVerdict::Linked { urls, terms } => {
                Ok(self.gate_links(ctx, &author, text, urls, terms).await)
            }
            ContentVerdict::Flagged(terms) => Ok(self.accept(&author, text, terms).await),
            ContentVerdict::Allowed => Ok(self.accept(&author, text, Vec::new()).await),
        }
    }

    /// Most recent messages, oldest first. Requires an active user.
    pub async fn history(
        &self,
        ctx: &RequestContext,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, AppError> {
        self.authorized_user(ctx, SystemPermission::MessageRead)?;
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        Ok(self.messages.recent(limit).await)
    }

    /// Delivers a message that passed the policy, warning the author about
    /// any sensitive-data `terms`.
    async fn accept(&self, author: &User, text: &str, terms: Vec<MatchedTerm>) -> MessageOutcome {
        let message = self
            .deliver(author, MessageId::new(), text, !terms.is_empty())
            .await;
        if let Some(warning) = sensitive_warning(&terms) {
            info!(
                target: "audit",
                user_id = %author.id,
                message_id = %message.id,
                terms = ?terms.iter().map(|t| t.term.as_str()).collect::<Vec<_>>(),
                "Message delivered with sensitive-data warning"
            );
            self.sessions.send_to_user(&author.id, &warning);
        }
        MessageOutcome::Delivered {
            message,
            warnings: terms,
        }
    }

    /// Routes a message with links by the links' current reputation.
    async fn gate_links(
        &self,
        ctx: &RequestContext,
        author: &User,
        text: &str,
        urls: Vec<String>,
        terms: Vec<MatchedTerm>,
    ) -> MessageOutcome {
        let mut malicious = Vec::new();
        let mut unvetted = Vec::new();
        for url in urls {
            match self.links.reputation(&url) {
                Some(UrlStatus::Safe) => {}
                Some(UrlStatus::Malicious) => malicious.push(url),
                _ => unvetted.push(url),
            }
        }

        if !malicious.is_empty() {
            info!(
                target: "audit",
                user_id = %author.id,
                urls = ?malicious,
                "Message refused for malicious links"
            );
            self.reply(
                ctx,
                OutboundMessage::error("POLICY_VIOLATION", refused_notice(&malicious)),
            );
            if let Some(warning) = sensitive_warning(&terms) {
                self.reply(ctx, warning);
            }
            return MessageOutcome::Refused { urls: malicious };
        }

        if unvetted.is_empty() {
            return self.accept(author, text, terms).await;
        }

        let (message_id, checks) = self.links.hold(author, text, !terms.is_empty(), &unvetted);
        info!(
            target: "audit",
            user_id = %author.id,
            message_id = %message_id,
            urls = ?unvetted,
            "Message held for link review"
        );
        self.reply(
            ctx,
            OutboundMessage::info(format!(
                "Your message contains {} link(s) that must be reviewed before it is published.",
                checks.len()
            )),
        );
        if let Some(warning) = sensitive_warning(&terms) {
            self.sessions.send_to_user(&author.id, &warning);
        }
        self.notify_admins(&OutboundMessage::info(format!(
            "Message from '{}' is waiting for review of {} link(s)",
            author.username,
            checks.len()
        )));
        MessageOutcome::Held(checks)
    }

    /// Appends to history and broadcasts under the history lock so every
    /// session observes the same order.
    pub(super) async fn deliver(
        &self,
        author: &User,
        id: MessageId,
        text: &str,
        flagged: bool,
    ) -> Message {
        let message = Message {
            id,
            user_id: author.id,
            username: author.username.clone(),
            display_name: author.display_name.clone(),
            text: text.to_string(),
            flagged,
            created_at: Utc::now(),
        };
        let audience = self.visible_audience();
        let delivered = self
            .messages
            .append_with(message.clone(), |stored| {
                self.sessions
                    .broadcast(&build_chat_message(stored), &audience)
            })
            .await;
        debug!(message_id = %message.id, delivered, "Message broadcast");
        message
    }

    /// Fans out the consequences of a recorded violation.
    fn announce_violation(&self, ctx: &RequestContext, record: &ViolationRecord) {
        self.reply(
            ctx,
            OutboundMessage::error(
                "POLICY_VIOLATION",
                format!(
                    "{} Violations: {}/{}",
                    blocked_notice(
                        &record.violation.matched_terms,
                        record.new_count,
                        record.crossed_threshold
                    ),
                    record.new_count,
                    self.ledger.threshold()
                ),
            ),
        );
        if let Some(warning) = sensitive_warning(&record.violation.matched_terms) {
            self.reply(ctx, warning);
        }

        if let Some(kind) = record.alert {
            let delivered = self.notify_admins(&build_admin_notification(kind, &record.user));
            if kind == AdminNotificationKind::UserBanned {
                warn!(
                    user_id = %record.user.id,
                    username = %record.user.username,
                    admins_notified = delivered,
                    "User banned at violation threshold"
                );
            }
        }

        if record.crossed_threshold {
            self.push_account_status(
                &record.user,
                format!(
                    "Your account has been banned after {} violations",
                    record.new_count
                ),
            );
        }
    }
}

/// Human-readable reason for a blocked message.
fn blocked_notice(terms: &[MatchedTerm], count: u32, banned: bool) -> String {
    let keywords: Vec<MatchedTerm> = terms
        .iter()
        .filter(|t| t.category == TermCategory::Keyword)
        .cloned()
        .collect();
    let listed: &[MatchedTerm] = if keywords.is_empty() { terms } else { &keywords };
    let mut notice = format!("Message blocked: contains {}.", join_terms(listed));
    if banned {
        notice.push_str(&format!(" Your account is banned after {count} violations."));
    }
    notice
}

/// Reason for a message refused over malicious links.
fn refused_notice(urls: &[String]) -> String {
    format!(
        "Message blocked: links to a blocked site ({}).",
        urls.join(", ")
    )
}

/// Soft warning for the sensitive-data part of `terms`, if there is one.
fn sensitive_warning(terms: &[MatchedTerm]) -> Option<OutboundMessage> {
    let sensitive: Vec<MatchedTerm> = terms.iter().filter(|t| t.is_sensitive()).cloned().collect();
    if sensitive.is_empty() {
        return None;
    }
    Some(OutboundMessage::warning(format!(
        "Your message contains sensitive data ({}). Please avoid sharing it.",
        join_terms(&sensitive)
    )))
}

fn join_terms(terms: &[MatchedTerm]) -> String {
    terms
        .iter()
        .map(|t| format!("'{}'", t.term))
        .collect::<Vec<_>>()
        .join(", ")
}
