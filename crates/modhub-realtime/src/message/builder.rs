//! Builder helpers for constructing outbound messages from entities.

use chrono::Utc;

use modhub_entity::file::FileUpload;
use modhub_entity::message::Message;
use modhub_entity::user::User;

use super::types::{AdminNotificationKind, OutboundMessage};

/// Build the broadcast frame for an accepted chat message
pub fn build_chat_message(message: &Message) -> OutboundMessage {
    OutboundMessage::Message {
        id: message.id,
        user_id: message.user_id,
        username: message.username.clone(),
        user: message.display_name.clone(),
        text: message.text.clone(),
        timestamp: message.created_at,
    }
}

/// Build the peer announcement for an upload
pub fn build_file_announcement(file: &FileUpload) -> OutboundMessage {
    OutboundMessage::File {
        user_id: file.user_id,
        username: file.username.clone(),
        user: file.display_name.clone(),
        file: Box::new(file.clone()),
    }
}

/// Build a status reconciliation frame for a file
pub fn build_file_status_update(file: &FileUpload) -> OutboundMessage {
    OutboundMessage::FileStatusUpdate {
        file_id: file.id,
        status: file.status,
    }
}

/// Build an admin alert about `user`'s current violation state
pub fn build_admin_notification(kind: AdminNotificationKind, user: &User) -> OutboundMessage {
    let message = match kind {
        AdminNotificationKind::UserBanned => format!(
            "User {} was banned after {} violations",
            user.display_name, user.violation_count
        ),
        AdminNotificationKind::ViolationWarning => format!(
            "User {} has {} violations",
            user.display_name, user.violation_count
        ),
    };
    OutboundMessage::AdminNotification {
        notification_type: kind,
        user_id: user.id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        violation_count: user.violation_count,
        is_banned: user.is_banned,
        message,
    }
}

/// Build the account-state push for `user`
pub fn build_account_status(user: &User, message: impl Into<String>) -> OutboundMessage {
    OutboundMessage::AccountStatus {
        is_banned: user.is_banned,
        violation_count: user.violation_count,
        message: message.into(),
    }
}

/// Build a keepalive ping
pub fn build_ping() -> OutboundMessage {
    OutboundMessage::Ping {
        timestamp: Utc::now().timestamp_millis(),
    }
}
