//! Background scan scheduling and the shared scan path.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use modhub_core::error::{AppError, ErrorKind};
use modhub_core::types::FileId;
use modhub_entity::file::{FileUpload, ModerationMode};
use modhub_realtime::OutboundMessage;
use modhub_realtime::message::builder::build_file_status_update;

use super::Hub;

/// Counts background scan tasks so shutdown can wait for them.
///
/// Tasks are detached: a client disconnect never cancels an accepted scan.
#[derive(Debug, Default)]
pub struct ScanTracker {
    /// Tasks spawned and not yet finished.
    in_flight: AtomicUsize,
    /// Woken when `in_flight` drops to zero.
    idle: Notify,
}

/// Decrements the tracker when the task finishes, panics, or is dropped.
struct InFlightGuard(Arc<ScanTracker>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl ScanTracker {
    /// Creates an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` and tracks it until completion.
    pub fn spawn<F>(self: &Arc<Self>, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard(self.clone());
        tokio::spawn(async move {
            let _guard = guard;
            task.await;
        });
    }

    /// Number of unfinished tasks.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Resolves once no task is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Hub {
    /// Schedules an automated scan for `file_id` without blocking the caller.
    pub(super) fn schedule_scan(&self, file_id: FileId) {
        let hub = self.clone();
        self.scans.spawn(async move {
            if let Err(err) = hub.run_scan(file_id).await {
                debug!(file_id = %file_id, error = %err, "Background scan ended with error");
            }
        });
    }

    /// Waits until every background scan has finished.
    pub async fn wait_for_scans(&self) {
        self.scans.wait_idle().await;
    }

    /// Waits at most `grace` for background scans. Returns `true` when all
    /// of them finished in time.
    pub async fn drain_scans(&self, grace: Duration) -> bool {
        let pending = self.scans.in_flight();
        if pending > 0 {
            info!(pending, grace_secs = grace.as_secs(), "Waiting for in-flight scans");
        }
        let drained = tokio::time::timeout(grace, self.scans.wait_idle()).await.is_ok();
        if !drained {
            warn!(remaining = self.scans.in_flight(), "Shutdown grace elapsed with scans in flight");
        }
        drained
    }

    /// Scans one file and feeds the verdict into the workflow.
    ///
    /// On failure or timeout the file stays `pending` with its failure
    /// marker set, admins are told, and the error is returned as
    /// `UpstreamUnavailable`. No retry happens here.
    pub(super) async fn run_scan(&self, file_id: FileId) -> Result<FileUpload, AppError> {
        let file = self.files.get(&file_id)?;
        if file.status.is_terminal() {
            return Err(AppError::conflict(format!(
                "Cannot scan file {file_id}: already {}",
                file.status
            )));
        }

        let bound = Duration::from_secs(self.config.scan_timeout_seconds.max(1));
        let result = match tokio::time::timeout(bound, self.file_scanner.scan(&file)).await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(err)) if err.kind == ErrorKind::UpstreamUnavailable => Err(err),
            Ok(Err(err)) => Err(AppError::upstream_unavailable(format!(
                "{} scan failed: {}",
                self.file_scanner.name(),
                err.message
            ))),
            Err(_) => Err(AppError::upstream_unavailable(format!(
                "{} scan timed out after {}s",
                self.file_scanner.name(),
                bound.as_secs()
            ))),
        };

        match result {
            Ok(report) => {
                let verdict = report.verdict;
                let summary = report.summary.clone();
                let (outcome, updated) = self
                    .files
                    .update(&file_id, |f| self.workflow.apply_scan(f, report))?;

                info!(
                    target: "audit",
                    file_id = %file_id,
                    scanner = self.file_scanner.name(),
                    verdict = ?verdict,
                    status = %updated.status,
                    "File scanned"
                );

                if outcome.status_changed() {
                    self.broadcast_visible(&build_file_status_update(&updated));
                } else if updated.moderation_mode == ModerationMode::Automated {
                    self.notify_admins(&OutboundMessage::info(format!(
                        "File '{}' needs manual review: {summary}",
                        updated.filename
                    )));
                }
                Ok(updated)
            }
            Err(err) => {
                warn!(file_id = %file_id, error = %err, "File scan failed");
                let (_, updated) = self
                    .files
                    .update(&file_id, |f| self.workflow.record_scan_failure(f, &err.message))?;
                self.notify_admins(&OutboundMessage::info(format!(
                    "Scan of '{}' failed: {}. Approve or reject it manually, or retry the scan.",
                    updated.filename, err.message
                )));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tracker_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_idle_after_tasks_finish() {
        let tracker = Arc::new(ScanTracker::new());
        for delay in [1u64, 5, 3] {
            tracker.spawn(async move {
                tokio::time::sleep(Duration::from_secs(delay)).await;
            });
        }
        assert_eq!(tracker.in_flight(), 3);
        tracker.wait_idle().await;
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_wait_idle_returns_immediately_when_empty() {
        ScanTracker::new().wait_idle().await;
    }
}
