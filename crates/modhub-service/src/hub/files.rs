//! File submission, announcement, and status transitions.

use chrono::Utc;
use tracing::info;

use modhub_core::error::AppError;
use modhub_core::types::FileId;
use modhub_entity::file::{FileStatus, FileUpload, ModerationMode};
use modhub_realtime::message::builder::{build_file_announcement, build_file_status_update};

use super::Hub;
use crate::context::RequestContext;
use crate::file::upload::validate_upload;
use crate::file::{FileDecision, UploadRequest};
use crate::rbac::SystemPermission;

/// Who is driving a file transition.
#[derive(Debug, Clone)]
pub enum Actor {
    /// A user acting through REST or a session.
    User(RequestContext),
    /// The hub itself; may only trigger scans.
    System,
}

impl Hub {
    /// Validates and stores an upload, then announces it to peers.
    ///
    /// Validation runs before any record exists. The announcement excludes
    /// the uploader and banned users. Automated uploads get a background
    /// scan that is not tied to the uploader's connection.
    pub async fn submit_file_upload(
        &self,
        ctx: &RequestContext,
        request: UploadRequest,
    ) -> Result<FileUpload, AppError> {
        let owner = self.authorized_user(ctx, SystemPermission::FileUpload)?;
        let validated = validate_upload(&request, &self.config)?;

        let file = FileUpload {
            id: FileId::new(),
            user_id: owner.id,
            username: owner.username.clone(),
            display_name: owner.display_name.clone(),
            filename: validated.filename,
            file_size: validated.size,
            file_type: validated.extension,
            content_type: request.content_type,
            sha256: validated.sha256,
            moderation_mode: request.moderation_mode,
            status: FileStatus::Pending,
            scan_result: None,
            scan_failed: false,
            scan_error: None,
            scan_flagged: false,
            created_at: Utc::now(),
            decided_at: None,
        };
        self.files.insert(file.clone());

        info!(
            target: "audit",
            file_id = %file.id,
            user_id = %owner.id,
            filename = %file.filename,
            size = file.file_size,
            mode = ?file.moderation_mode,
            "File submitted"
        );

        self.sessions.broadcast(
            &build_file_announcement(&file),
            &self.visible_audience_except(owner.id),
        );

        if file.moderation_mode == ModerationMode::Automated {
            self.schedule_scan(file.id);
        }
        Ok(file)
    }

    /// Re-announces one of the sender's own uploads to peers, built from
    /// the stored record rather than anything the client sent.
    pub fn announce_file(
        &self,
        ctx: &RequestContext,
        file_id: &FileId,
    ) -> Result<FileUpload, AppError> {
        let owner = self.authorized_user(ctx, SystemPermission::FileUpload)?;
        let file = self.files.get(file_id)?;
        if file.user_id != owner.id {
            return Err(AppError::authorization("You can only announce your own files"));
        }
        self.sessions.broadcast(
            &build_file_announcement(&file),
            &self.visible_audience_except(owner.id),
        );
        Ok(file)
    }

    /// Applies `decision` to a file on behalf of `actor`.
    ///
    /// A status change broadcasts exactly one status update to every
    /// non-banned session. Decisions on terminal files are conflicts and
    /// broadcast nothing.
    pub async fn transition_file(
        &self,
        actor: &Actor,
        file_id: &FileId,
        decision: FileDecision,
    ) -> Result<FileUpload, AppError> {
        let admin = match actor {
            Actor::User(ctx) => Some(self.authorized_user(ctx, SystemPermission::FileModerate)?),
            Actor::System if decision == FileDecision::Scan => None,
            Actor::System => {
                return Err(AppError::authorization(format!(
                    "Only an admin can {decision} a file"
                )));
            }
        };

        let (outcome, updated) = match decision {
            FileDecision::Scan => return self.run_scan(*file_id).await,
            FileDecision::Approve => self.files.update(file_id, |f| self.workflow.approve(f))?,
            FileDecision::Reject => self.files.update(file_id, |f| self.workflow.reject(f))?,
        };

        info!(
            target: "audit",
            file_id = %file_id,
            actor_id = ?admin.as_ref().map(|a| a.id),
            decision = %decision,
            status = %updated.status,
            "File decision applied"
        );
        if outcome.status_changed() {
            self.broadcast_visible(&build_file_status_update(&updated));
        }
        Ok(updated)
    }

    /// Approves a pending file.
    pub async fn approve_file(
        &self,
        ctx: &RequestContext,
        file_id: &FileId,
    ) -> Result<FileUpload, AppError> {
        self.transition_file(&Actor::User(ctx.clone()), file_id, FileDecision::Approve)
            .await
    }

    /// Rejects a pending file.
    pub async fn reject_file(
        &self,
        ctx: &RequestContext,
        file_id: &FileId,
    ) -> Result<FileUpload, AppError> {
        self.transition_file(&Actor::User(ctx.clone()), file_id, FileDecision::Reject)
            .await
    }

    /// Runs the file scanner now and waits for the result.
    pub async fn scan_file(
        &self,
        ctx: &RequestContext,
        file_id: &FileId,
    ) -> Result<FileUpload, AppError> {
        self.transition_file(&Actor::User(ctx.clone()), file_id, FileDecision::Scan)
            .await
    }

    /// One file, if the caller may see it.
    pub fn get_file(&self, ctx: &RequestContext, file_id: &FileId) -> Result<FileUpload, AppError> {
        let viewer = self.active_user(&ctx.user_id)?;
        let file = self.files.get(file_id)?;
        if !file.is_visible_to(viewer.id, viewer.is_admin()) {
            return Err(AppError::not_found(format!("File {file_id} not found")));
        }
        Ok(file)
    }

    /// Approved files, newest first.
    pub fn approved_files(&self, ctx: &RequestContext) -> Result<Vec<FileUpload>, AppError> {
        self.active_user(&ctx.user_id)?;
        Ok(self.files.approved())
    }

    /// The caller's own uploads in every status.
    pub fn my_files(&self, ctx: &RequestContext) -> Result<Vec<FileUpload>, AppError> {
        let owner = self.active_user(&ctx.user_id)?;
        Ok(self.files.owned_by(&owner.id))
    }

    /// Files awaiting a decision. Admins only.
    pub fn pending_files(&self, ctx: &RequestContext) -> Result<Vec<FileUpload>, AppError> {
        self.authorized_user(ctx, SystemPermission::FileModerate)?;
        Ok(self.files.pending())
    }

    /// Every file. Admins only.
    pub fn all_files(&self, ctx: &RequestContext) -> Result<Vec<FileUpload>, AppError> {
        self.authorized_user(ctx, SystemPermission::FileModerate)?;
        Ok(self.files.all())
    }
}
