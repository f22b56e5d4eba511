//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use modhub_core::config::RealtimeConfig;

use super::handle::{SendOutcome, SessionHandle};
use crate::message::builder::build_ping;

/// Heartbeat configuration
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Silence after which the session is considered dead
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds.max(1)),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds.max(1)),
        }
    }
}

/// Run heartbeat loop for a session.
///
/// Sends periodic pings and checks for inbound activity. Marks the session
/// dead if nothing was received within the timeout.
pub async fn run_heartbeat(handle: Arc<SessionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval);
    // first tick fires immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let elapsed = Utc::now() - handle.last_seen().await;
        if let Ok(elapsed) = elapsed.to_std() {
            if elapsed > config.ping_timeout {
                tracing::warn!(
                    session_id = %handle.id,
                    silent_for = ?elapsed,
                    "Session heartbeat timeout"
                );
                handle.mark_dead();
                break;
            }
        }

        if handle.send(build_ping()) == SendOutcome::Closed {
            tracing::debug!(session_id = %handle.id, "Ping send failed, session closed");
            break;
        }
    }

    tracing::debug!(session_id = %handle.id, "Heartbeat loop ended");
}
