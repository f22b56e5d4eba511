//! Chat message entity.

use chrono::{DateTime, Utc};
use modhub_core::types::{MessageId, UserId};
use serde::{Deserialize, Serialize};

/// A chat message that passed the content policy. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Author.
    pub user_id: UserId,
    /// Author's username at send time.
    pub username: String,
    /// Author's display name at send time.
    pub display_name: String,
    /// Message body, trimmed.
    pub text: String,
    /// Whether the content scanner attached a soft warning.
    pub flagged: bool,
    /// When the hub accepted the message.
    pub created_at: DateTime<Utc>,
}
