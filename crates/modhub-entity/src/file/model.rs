//! Uploaded file entity model.

use chrono::{DateTime, Utc};
use modhub_core::types::{FileId, UserId};
use serde::{Deserialize, Serialize};

use super::scan::ScanReport;
use super::status::{FileStatus, ModerationMode};

/// A file submitted for moderation.
///
/// Status only moves from `pending` to a terminal state; re-submission
/// creates a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUpload {
    /// Unique file identifier.
    pub id: FileId,
    /// Owner.
    pub user_id: UserId,
    /// Owner's username.
    pub username: String,
    /// Owner's display name.
    pub display_name: String,
    /// Original file name.
    pub filename: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Lowercase extension without the dot.
    pub file_type: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Hex SHA-256 of the content, used as the reputation lookup key.
    pub sha256: String,
    /// Who drives the decision.
    pub moderation_mode: ModerationMode,
    /// Current moderation status.
    pub status: FileStatus,
    /// Most recent scan report.
    pub scan_result: Option<ScanReport>,
    /// Set when the most recent scan attempt failed or timed out.
    pub scan_failed: bool,
    /// Failure detail for the most recent scan attempt.
    pub scan_error: Option<String>,
    /// Set when the file was approved despite a suspicious verdict.
    pub scan_flagged: bool,
    /// When the file was submitted.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub decided_at: Option<DateTime<Utc>>,
}

impl FileUpload {
    /// Whether `viewer` may see this file in listings.
    pub fn is_visible_to(&self, viewer: UserId, viewer_is_admin: bool) -> bool {
        self.status == FileStatus::Approved || viewer_is_admin || self.user_id == viewer
    }
}
