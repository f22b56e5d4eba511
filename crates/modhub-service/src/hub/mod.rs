//! The hub: policy evaluation and fan-out for every moderated action.
//!
//! Every entry point first re-reads the acting user from the directory and
//! rejects unknown or banned actors, so role and ban changes take effect on
//! the very next action. Outbound traffic for ordinary participants never
//! reaches banned users' sessions; admin alerts go only to current admins.

mod admin;
mod files;
mod inbound;
mod link_review;
mod messages;
mod scan;


use std::sync::Arc;

use tracing::info;

use modhub_core::config::{AppConfig, BootstrapConfig, ModerationConfig};
use modhub_core::error::AppError;
use modhub_core::types::UserId;
use modhub_entity::user::{User, UserRole};
use modhub_realtime::message::builder::build_account_status;
use modhub_realtime::{Audience, OutboundMessage, SessionRegistry};

use crate::context::RequestContext;
use crate::file::{FileStore, FileWorkflow};
use crate::links::LinkRegistry;
use crate::message::MessageLog;
use crate::moderation::ViolationLedger;
use crate::rbac::{RbacEnforcer, SystemPermission};
use crate::scanner::{
    ContentScanner, FileScanner, KeywordScanner, LocalReputationScanner, UrlScanner,
    build_file_scanner, build_url_scanner,
};
use crate::user::UserDirectory;

pub use files::Actor;
pub use link_review::UrlDecision;
pub use messages::{Accepted, MessageOutcome};
pub use scan::ScanTracker;

/// Retained chat history length.
const MESSAGE_HISTORY: usize = 1000;

/// Orchestrates messages, files, and violations across all sessions.
///
/// Cheap to clone; all state is shared.
#[derive(Debug, Clone)]
pub struct Hub {
    /// Moderation limits and thresholds.
    config: Arc<ModerationConfig>,
    /// User directory.
    directory: Arc<UserDirectory>,
    /// Violation ledger.
    ledger: Arc<ViolationLedger>,
    /// File records.
    files: Arc<FileStore>,
    /// File state machine.
    workflow: FileWorkflow,
    /// Chat history.
    messages: Arc<MessageLog>,
    /// Live sessions.
    sessions: Arc<SessionRegistry>,
    /// Text policy.
    content_scanner: Arc<dyn ContentScanner>,
    /// File reputation lookup.
    file_scanner: Arc<dyn FileScanner>,
    /// Link checks and held messages.
    links: Arc<LinkRegistry>,
    /// Link reputation lookup.
    url_scanner: Arc<dyn UrlScanner>,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
    /// In-flight background scans.
    scans: Arc<ScanTracker>,
}

impl Hub {
    /// Creates a hub with explicit content and file scanners. Links are
    /// checked by the local reputation stand-in until
    /// [`with_url_scanner`](Self::with_url_scanner) replaces it.
    pub fn new(
        config: ModerationConfig,
        sessions: Arc<SessionRegistry>,
        content_scanner: Arc<dyn ContentScanner>,
        file_scanner: Arc<dyn FileScanner>,
    ) -> Self {
        let directory = Arc::new(UserDirectory::new());
        let rbac = Arc::new(RbacEnforcer::new());
        let ledger = Arc::new(ViolationLedger::new(directory.clone(), rbac.clone(), &config));
        let workflow = FileWorkflow::new(config.suspicious_verdict);

        info!(
            ban_threshold = config.ban_threshold,
            admin_alert_interval = config.admin_alert_interval,
            suspicious_verdict = %config.suspicious_verdict,
            file_scanner = file_scanner.name(),
            "Hub initialized"
        );

        Self {
            config: Arc::new(config),
            directory,
            ledger,
            files: Arc::new(FileStore::new()),
            workflow,
            messages: Arc::new(MessageLog::new(MESSAGE_HISTORY)),
            sessions,
            content_scanner,
            file_scanner,
            links: Arc::new(LinkRegistry::new()),
            url_scanner: Arc::new(LocalReputationScanner::new()),
            rbac,
            scans: Arc::new(ScanTracker::new()),
        }
    }

    /// Replaces the link reputation scanner.
    pub fn with_url_scanner(mut self, url_scanner: Arc<dyn UrlScanner>) -> Self {
        info!(url_scanner = url_scanner.name(), "Link scanner configured");
        self.url_scanner = url_scanner;
        self
    }

    /// Creates a hub with the default scanners for `config`.
    pub fn from_config(config: &AppConfig, sessions: Arc<SessionRegistry>) -> Result<Self, AppError> {
        let content_scanner = Arc::new(KeywordScanner::new(&config.moderation.forbidden_keywords)?);
        let file_scanner = build_file_scanner(&config.scanner)?;
        let url_scanner = build_url_scanner(&config.scanner)?;
        Ok(Self::new(
            config.moderation.clone(),
            sessions,
            content_scanner,
            file_scanner,
        )
        .with_url_scanner(url_scanner))
    }

    /// Registers a new member.
    pub fn register_user(&self, username: &str, display_name: &str) -> Result<User, AppError> {
        self.directory.register(username, display_name, UserRole::Member)
    }

    /// Seeds the super-admin account. Returns the existing account when the
    /// username is already registered.
    pub fn bootstrap_super_admin(&self, bootstrap: &BootstrapConfig) -> Result<User, AppError> {
        if let Some(existing) = self.directory.find_by_username(&bootstrap.super_admin_username) {
            if !existing.role.is_super_admin() {
                return Err(AppError::configuration(format!(
                    "Bootstrap username '{}' belongs to a non-super-admin account",
                    existing.username
                )));
            }
            return Ok(existing);
        }
        let user = self.directory.register(
            &bootstrap.super_admin_username,
            &bootstrap.super_admin_display_name,
            UserRole::SuperAdmin,
        )?;
        info!(user_id = %user.id, username = %user.username, "Super-admin seeded");
        Ok(user)
    }

    /// User directory.
    pub fn directory(&self) -> &Arc<UserDirectory> {
        &self.directory
    }

    /// Violation ledger.
    pub fn ledger(&self) -> &Arc<ViolationLedger> {
        &self.ledger
    }

    /// File records.
    pub fn files(&self) -> &Arc<FileStore> {
        &self.files
    }

    /// Link checks and held messages.
    pub fn links(&self) -> &Arc<LinkRegistry> {
        &self.links
    }

    /// Live sessions.
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Moderation configuration.
    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// Looks up the acting user and rejects unknown or banned actors.
    pub fn active_user(&self, user_id: &UserId) -> Result<User, AppError> {
        let user = self
            .directory
            .get(user_id)
            .map_err(|_| AppError::authorization("Unknown user"))?;
        if user.is_banned {
            return Err(AppError::authorization("Your account is banned"));
        }
        Ok(user)
    }

    /// Looks up the acting user and checks `permission` against the role
    /// it holds right now.
    fn authorized_user(
        &self,
        ctx: &RequestContext,
        permission: SystemPermission,
    ) -> Result<User, AppError> {
        let user = self.active_user(&ctx.user_id)?;
        self.rbac.require_permission(&user.role, &permission)?;
        Ok(user)
    }

    /// Everyone who is not banned.
    fn visible_audience(&self) -> Audience {
        Audience::Except(self.directory.banned_ids())
    }

    /// Everyone who is not banned, minus `user_id`.
    fn visible_audience_except(&self, user_id: UserId) -> Audience {
        let mut excluded = self.directory.banned_ids();
        excluded.insert(user_id);
        Audience::Except(excluded)
    }

    /// Broadcasts to every non-banned user.
    fn broadcast_visible(&self, message: &OutboundMessage) -> usize {
        self.sessions.broadcast(message, &self.visible_audience())
    }

    /// Delivers to current, non-banned admins only.
    fn notify_admins(&self, message: &OutboundMessage) -> usize {
        self.sessions
            .broadcast(message, &Audience::Only(self.directory.active_admin_ids()))
    }

    /// Replies on the session the request came from, if any.
    fn reply(&self, ctx: &RequestContext, message: OutboundMessage) {
        if let Some(session_id) = ctx.session_id {
            self.sessions.send_to_session(&session_id, &message);
        }
    }

    /// Pushes the user's current account state to all of their sessions.
    fn push_account_status(&self, user: &User, message: impl Into<String>) {
        self.sessions
            .send_to_user(&user.id, &build_account_status(user, message));
    }
}
