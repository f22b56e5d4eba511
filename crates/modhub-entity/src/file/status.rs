//! File moderation status and mode enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Moderation status of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Awaiting a decision.
    Pending,
    /// Visible to every participant. Terminal.
    Approved,
    /// Hidden from everyone but the owner and admins. Terminal.
    Rejected,
}

impl FileStatus {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which actor drives a pending file to its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModerationMode {
    /// An admin decides.
    #[default]
    Manual,
    /// The reputation scan decides; admins may still override.
    Automated,
}

impl ModerationMode {
    /// Return the mode as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automated => "automated",
        }
    }
}

impl fmt::Display for ModerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModerationMode {
    type Err = modhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "automated" | "auto" | "virustotal" => Ok(Self::Automated),
            _ => Err(modhub_core::AppError::validation(format!(
                "Invalid moderation mode: '{s}'. Expected one of: manual, automated"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminality() {
        assert!(!FileStatus::Pending.is_terminal());
        assert!(FileStatus::Approved.is_terminal());
        assert!(FileStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("AUTOMATED".parse::<ModerationMode>().unwrap(), ModerationMode::Automated);
        assert_eq!("virustotal".parse::<ModerationMode>().unwrap(), ModerationMode::Automated);
        assert!("magic".parse::<ModerationMode>().is_err());
    }
}
