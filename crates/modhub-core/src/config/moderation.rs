//! Moderation policy configuration.
//!
//! Thresholds and limits consumed by the hub, the violation ledger, and the
//! file workflow.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What an automated scan does with a suspicious (non-definitive) verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuspiciousVerdictPolicy {
    /// Move the file to `rejected`.
    Reject,
    /// Leave the file `pending` with the report attached for a human.
    #[default]
    Hold,
    /// Move the file to `approved` but keep the flag on the record.
    ApproveFlagged,
}

impl fmt::Display for SuspiciousVerdictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Hold => write!(f, "hold"),
            Self::ApproveFlagged => write!(f, "approve_flagged"),
        }
    }
}

/// Moderation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Violation count at which a member is automatically banned.
    #[serde(default = "default_ban_threshold")]
    pub ban_threshold: u32,
    /// Admins are alerted on every n-th violation below the ban threshold.
    #[serde(default = "default_admin_alert_interval")]
    pub admin_alert_interval: u32,
    /// Maximum chat message length in characters.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Allowed file extensions, lowercase without the leading dot.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Upper bound for a single external scan call in seconds.
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_seconds: u64,
    /// Handling of suspicious automated verdicts.
    #[serde(default)]
    pub suspicious_verdict: SuspiciousVerdictPolicy,
    /// Case-insensitive forbidden keywords for the default content scanner.
    #[serde(default = "default_forbidden_keywords")]
    pub forbidden_keywords: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            ban_threshold: default_ban_threshold(),
            admin_alert_interval: default_admin_alert_interval(),
            max_message_length: default_max_message_length(),
            max_file_size_bytes: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
            scan_timeout_seconds: default_scan_timeout(),
            suspicious_verdict: SuspiciousVerdictPolicy::default(),
            forbidden_keywords: default_forbidden_keywords(),
        }
    }
}

impl ModerationConfig {
    /// Whether `extension` (any case, with or without a leading dot) is allowed.
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
    }
}

fn default_ban_threshold() -> u32 {
    10
}

fn default_admin_alert_interval() -> u32 {
    5
}

fn default_max_message_length() -> usize {
    2000
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["exe".to_string(), "doc".to_string(), "docx".to_string()]
}

fn default_scan_timeout() -> u64 {
    30
}

fn default_forbidden_keywords() -> Vec<String> {
    ["confidential", "secret", "password", "bank card", "credit card"]
        .into_iter()
        .map(String::from)
        .collect()
}
