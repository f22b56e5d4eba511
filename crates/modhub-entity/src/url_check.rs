//! Link review records.
//!
//! A chat message that links somewhere the hub has not vetted is held
//! back. Every unvetted link in it gets a [`UrlCheck`]; the message is
//! published once all of them are marked safe and dropped as soon as one
//! is marked malicious.

use std::fmt;

use chrono::{DateTime, Utc};
use modhub_core::types::{MessageId, UrlCheckId, UserId};
use serde::{Deserialize, Serialize};

use crate::file::ScanReport;

/// Review state of one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStatus {
    /// Waiting for an admin or a reputation scan.
    Pending,
    /// Vetted. Messages linking here are delivered.
    Safe,
    /// Blocked. Messages linking here are refused.
    Malicious,
    /// A scan flagged it; an admin still has to decide.
    Suspicious,
}

impl UrlStatus {
    /// Whether no further decision can change this check.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Safe | Self::Malicious)
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Safe => write!(f, "safe"),
            Self::Malicious => write!(f, "malicious"),
            Self::Suspicious => write!(f, "suspicious"),
        }
    }
}

/// One link from one held message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlCheck {
    /// Unique check identifier.
    pub id: UrlCheckId,
    /// The link as it appeared in the message.
    pub url: String,
    /// Id the held message is published under.
    pub message_id: MessageId,
    /// Author of the held message.
    pub user_id: UserId,
    /// Author's username.
    pub username: String,
    /// Author's display name.
    pub display_name: String,
    /// Full text of the held message.
    pub message_text: String,
    /// Review state.
    pub status: UrlStatus,
    /// Last reputation scan, if any.
    pub scan: Option<ScanReport>,
    /// Whether an admin or a conclusive scan has looked at it.
    pub is_reviewed: bool,
    /// Admin who made the final call.
    pub reviewed_by: Option<UserId>,
    /// When the message was held.
    pub created_at: DateTime<Utc>,
    /// When the check was last reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_safe_and_malicious_are_final() {
        assert!(UrlStatus::Safe.is_final());
        assert!(UrlStatus::Malicious.is_final());
        assert!(!UrlStatus::Pending.is_final());
        assert!(!UrlStatus::Suspicious.is_final());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UrlStatus::Malicious).expect("serialize"),
            "\"malicious\""
        );
    }
}
