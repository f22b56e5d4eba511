//! File moderation state machine.
//!
//! ```text
//! pending --approve--> approved
//! pending --reject---> rejected
//! pending --scan-----> approved | rejected | pending (report attached)
//! ```
//!
//! `approved` and `rejected` are terminal. Any decision on a terminal file
//! is a conflict, including a re-scan, so callers can tell "ignored" from
//! "nothing to do".

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use modhub_core::config::SuspiciousVerdictPolicy;
use modhub_core::error::AppError;
use modhub_entity::file::{FileStatus, FileUpload, ModerationMode, ScanReport, ScanVerdict};

/// A requested moderation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileDecision {
    /// Make the file visible to everyone.
    Approve,
    /// Hide the file.
    Reject,
    /// Run (or re-run) the reputation scan.
    Scan,
}

impl fmt::Display for FileDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
            Self::Scan => write!(f, "scan"),
        }
    }
}

/// What a successful transition did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Status moved to a terminal state.
    StatusChanged(FileStatus),
    /// Only the scan report or failure marker changed.
    Annotated,
}

impl TransitionOutcome {
    /// Whether the status changed (and a status update must be broadcast).
    pub fn status_changed(&self) -> bool {
        matches!(self, Self::StatusChanged(_))
    }
}

/// Applies decisions to a single file record.
///
/// Stateless apart from the suspicious-verdict policy. Callers hold the
/// file's store entry for the duration of a call.
#[derive(Debug, Clone, Copy)]
pub struct FileWorkflow {
    /// Handling of suspicious automated verdicts.
    suspicious: SuspiciousVerdictPolicy,
}

impl FileWorkflow {
    /// Creates a workflow with the given suspicious-verdict policy.
    pub fn new(suspicious: SuspiciousVerdictPolicy) -> Self {
        Self { suspicious }
    }

    /// Admin approval. Allowed in either mode, overriding any scan result.
    pub fn approve(&self, file: &mut FileUpload) -> Result<TransitionOutcome, AppError> {
        ensure_pending(file, FileDecision::Approve)?;
        Ok(set_status(file, FileStatus::Approved))
    }

    /// Admin rejection. Allowed in either mode.
    pub fn reject(&self, file: &mut FileUpload) -> Result<TransitionOutcome, AppError> {
        ensure_pending(file, FileDecision::Reject)?;
        Ok(set_status(file, FileStatus::Rejected))
    }

    /// Attaches a scan report and, for automated files, applies its verdict.
    ///
    /// Manual files only get the report; the admin still decides. An
    /// `unknown` verdict never changes status.
    pub fn apply_scan(
        &self,
        file: &mut FileUpload,
        report: ScanReport,
    ) -> Result<TransitionOutcome, AppError> {
        ensure_pending(file, FileDecision::Scan)?;
        let verdict = report.verdict;
        file.scan_result = Some(report);
        file.scan_failed = false;
        file.scan_error = None;

        if file.moderation_mode != ModerationMode::Automated {
            return Ok(TransitionOutcome::Annotated);
        }

        let next = match verdict {
            ScanVerdict::Clean => Some(FileStatus::Approved),
            ScanVerdict::Malicious => Some(FileStatus::Rejected),
            ScanVerdict::Suspicious => match self.suspicious {
                SuspiciousVerdictPolicy::Reject => Some(FileStatus::Rejected),
                SuspiciousVerdictPolicy::Hold => None,
                SuspiciousVerdictPolicy::ApproveFlagged => {
                    file.scan_flagged = true;
                    Some(FileStatus::Approved)
                }
            },
            ScanVerdict::Unknown => None,
        };

        Ok(match next {
            Some(status) => set_status(file, status),
            None => TransitionOutcome::Annotated,
        })
    }

    /// Marks a failed or timed-out scan. Status stays `pending`.
    pub fn record_scan_failure(
        &self,
        file: &mut FileUpload,
        error: &str,
    ) -> Result<TransitionOutcome, AppError> {
        ensure_pending(file, FileDecision::Scan)?;
        file.scan_failed = true;
        file.scan_error = Some(error.to_string());
        Ok(TransitionOutcome::Annotated)
    }
}

impl Default for FileWorkflow {
    fn default() -> Self {
        Self::new(SuspiciousVerdictPolicy::default())
    }
}

fn ensure_pending(file: &FileUpload, decision: FileDecision) -> Result<(), AppError> {
    if file.status.is_terminal() {
        return Err(AppError::conflict(format!(
            "Cannot {decision} file {}: already {}",
            file.id, file.status
        )));
    }
    Ok(())
}

fn set_status(file: &mut FileUpload, status: FileStatus) -> TransitionOutcome {
    file.status = status;
    file.decided_at = Some(Utc::now());
    TransitionOutcome::StatusChanged(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modhub_core::ErrorKind;
    use modhub_core::types::{FileId, UserId};

    fn file(mode: ModerationMode) -> FileUpload {
        FileUpload {
            id: FileId::new(),
            user_id: UserId::new(),
            username: "alice".into(),
            display_name: "Alice".into(),
            filename: "setup.exe".into(),
            file_size: 10,
            file_type: "exe".into(),
            content_type: None,
            sha256: "00".into(),
            moderation_mode: mode,
            status: FileStatus::Pending,
            scan_result: None,
            scan_failed: false,
            scan_error: None,
            scan_flagged: false,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    fn report(verdict: ScanVerdict) -> ScanReport {
        match verdict {
            ScanVerdict::Clean => ScanReport::from_counts("test", 0, 0, 5, 60),
            ScanVerdict::Suspicious => ScanReport::from_counts("test", 0, 2, 0, 60),
            ScanVerdict::Malicious => ScanReport::from_counts("test", 3, 0, 0, 60),
            ScanVerdict::Unknown => ScanReport::unknown("test"),
        }
    }

    #[test]
    fn test_terminal_states_reject_every_decision() {
        let workflow = FileWorkflow::default();
        let mut f = file(ModerationMode::Manual);
        workflow.reject(&mut f).expect("reject");

        let err = workflow.approve(&mut f).expect_err("approve after reject");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(f.status, FileStatus::Rejected);
        assert!(workflow.apply_scan(&mut f, report(ScanVerdict::Clean)).is_err());
        assert!(workflow.record_scan_failure(&mut f, "boom").is_err());
    }

    #[test]
    fn test_automated_verdicts_drive_status() {
        let workflow = FileWorkflow::default();
        let cases = [
            (ScanVerdict::Clean, FileStatus::Approved),
            (ScanVerdict::Malicious, FileStatus::Rejected),
            (ScanVerdict::Suspicious, FileStatus::Pending),
            (ScanVerdict::Unknown, FileStatus::Pending),
        ];
        for (verdict, expected) in cases {
            let mut f = file(ModerationMode::Automated);
            let outcome = workflow.apply_scan(&mut f, report(verdict)).expect("scan");
            assert_eq!(f.status, expected, "verdict {verdict:?}");
            assert_eq!(outcome.status_changed(), expected != FileStatus::Pending);
            assert!(f.scan_result.is_some());
        }
    }

    #[test]
    fn test_suspicious_policy_variants() {
        let mut f = file(ModerationMode::Automated);
        FileWorkflow::new(SuspiciousVerdictPolicy::Reject)
            .apply_scan(&mut f, report(ScanVerdict::Suspicious))
            .expect("scan");
        assert_eq!(f.status, FileStatus::Rejected);

        let mut f = file(ModerationMode::Automated);
        FileWorkflow::new(SuspiciousVerdictPolicy::ApproveFlagged)
            .apply_scan(&mut f, report(ScanVerdict::Suspicious))
            .expect("scan");
        assert_eq!(f.status, FileStatus::Approved);
        assert!(f.scan_flagged);
    }

    #[test]
    fn test_manual_scan_only_attaches_report() {
        let workflow = FileWorkflow::default();
        let mut f = file(ModerationMode::Manual);
        let outcome = workflow
            .apply_scan(&mut f, report(ScanVerdict::Malicious))
            .expect("scan");
        assert_eq!(outcome, TransitionOutcome::Annotated);
        assert_eq!(f.status, FileStatus::Pending);
    }

    #[test]
    fn test_failure_then_admin_override() {
        let workflow = FileWorkflow::default();
        let mut f = file(ModerationMode::Automated);
        workflow.record_scan_failure(&mut f, "timed out").expect("failure");
        assert!(f.scan_failed);
        assert_eq!(f.status, FileStatus::Pending);

        workflow.approve(&mut f).expect("override");
        assert_eq!(f.status, FileStatus::Approved);
        assert!(f.decided_at.is_some());
    }
}
