//! Inbound and outbound WebSocket message type definitions.
//!
//! One JSON object per frame, discriminated by its `type` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use modhub_core::types::{FileId, MessageId, UserId};
use modhub_entity::file::{FileStatus, FileUpload};

/// Messages sent by the client to the hub.
///
/// Identity fields are advisory: the session's own user is authoritative
/// and a mismatching `user_id` is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// A chat message.
    Message {
        /// Claimed author ID.
        #[serde(default)]
        user_id: Option<UserId>,
        /// Claimed author username.
        #[serde(default)]
        username: Option<String>,
        /// Claimed author display name.
        #[serde(default)]
        user: Option<String>,
        /// Message body.
        text: String,
        /// Client-side timestamp, informational only.
        #[serde(default)]
        timestamp: Option<String>,
    },
    /// Announce an upload that completed over REST.
    File {
        /// Claimed owner ID.
        #[serde(default)]
        user_id: Option<UserId>,
        /// Claimed owner username.
        #[serde(default)]
        username: Option<String>,
        /// Claimed owner display name.
        #[serde(default)]
        user: Option<String>,
        /// The upload projection returned by the REST endpoint. Only the
        /// ID is read; everything else comes from the stored record.
        file: FileReference,
    },
    /// Pong response to a server ping.
    Pong {
        /// Echoed timestamp.
        #[serde(default)]
        timestamp: Option<i64>,
    },
}

/// Reference to a stored upload inside an inbound `file` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReference {
    /// Stored file ID.
    pub id: FileId,
}

/// Kind of an admin notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminNotificationKind {
    /// Periodic violation milestone below the ban threshold.
    ViolationWarning,
    /// The user crossed the ban threshold and was suspended.
    UserBanned,
}

/// Messages sent by the hub to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// An accepted chat message, broadcast in global arrival order.
    Message {
        /// Message ID.
        id: MessageId,
        /// Author ID.
        user_id: UserId,
        /// Author username.
        username: String,
        /// Author display name.
        user: String,
        /// Message body.
        text: String,
        /// When the hub accepted it.
        timestamp: DateTime<Utc>,
    },
    /// A new upload announced to peers.
    File {
        /// Owner ID.
        user_id: UserId,
        /// Owner username.
        username: String,
        /// Owner display name.
        user: String,
        /// Upload projection.
        file: Box<FileUpload>,
    },
    /// A file's moderation status changed.
    FileStatusUpdate {
        /// File ID.
        file_id: FileId,
        /// New status.
        status: FileStatus,
    },
    /// Hard rejection of the sender's last action.
    Error {
        /// Machine-readable code.
        code: String,
        /// Human-readable reason.
        message: String,
    },
    /// Soft warning; the action went through.
    Warning {
        /// Human-readable text.
        message: String,
    },
    /// Informational notice.
    Info {
        /// Human-readable text.
        message: String,
    },
    /// Moderation alert, delivered only to admin-role sessions.
    AdminNotification {
        /// Alert kind.
        notification_type: AdminNotificationKind,
        /// Offending user ID.
        user_id: UserId,
        /// Offending username.
        username: String,
        /// Offending display name.
        display_name: String,
        /// Violation count after this event.
        violation_count: u32,
        /// Whether the user is now banned.
        is_banned: bool,
        /// Human-readable summary.
        message: String,
    },
    /// The recipient's own account state changed.
    AccountStatus {
        /// Whether the account is banned.
        is_banned: bool,
        /// Current violation count.
        violation_count: u32,
        /// Human-readable explanation.
        message: String,
    },
    /// Ping (server keepalive).
    Ping {
        /// Server timestamp, epoch milliseconds.
        timestamp: i64,
    },
}

impl OutboundMessage {
    /// Shorthand for an `error` frame.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a `warning` frame.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Shorthand for an `info` frame.
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    /// The `type` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::File { .. } => "file",
            Self::FileStatusUpdate { .. } => "file_status_update",
            Self::Error { .. } => "error",
            Self::Warning { .. } => "warning",
            Self::Info { .. } => "info",
            Self::AdminNotification { .. } => "admin_notification",
            Self::AccountStatus { .. } => "account_status",
            Self::Ping { .. } => "ping",
        }
    }
}
