//! Session registry: connection lifecycle and fan-out.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use modhub_core::config::RealtimeConfig;
use modhub_core::types::{SessionId, UserId};

use crate::message::types::OutboundMessage;
use crate::metrics::EngineMetrics;

use super::audience::Audience;
use super::handle::{SendOutcome, SessionHandle};
use super::pool::SessionPool;

/// Tracks live sessions and delivers outbound frames to them.
///
/// Delivery never waits on a slow client: every send is a non-blocking
/// push onto that session's bounded queue.
#[derive(Debug)]
pub struct SessionRegistry {
    /// Session pool.
    pool: SessionPool,
    /// Metrics.
    metrics: Arc<EngineMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl SessionRegistry {
    /// Creates a new registry.
    pub fn new(config: RealtimeConfig, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            pool: SessionPool::new(),
            metrics,
            config,
        }
    }

    /// Registers a new session for `user_id`.
    ///
    /// Returns the session handle and the receiver the socket writer drains.
    /// When the user already has the maximum number of sessions the oldest
    /// ones are evicted and closed.
    pub fn register(
        &self,
        user_id: UserId,
        username: String,
    ) -> (Arc<SessionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.config.session_queue_size.max(1));
        let handle = Arc::new(SessionHandle::new(user_id, username, tx));

        let evicted = self
            .pool
            .add_bounded(handle.clone(), self.config.max_sessions_per_user.max(1));
        for old in &evicted {
            warn!(
                session_id = %old.id,
                user_id = %user_id,
                max = self.config.max_sessions_per_user,
                "User at max sessions, evicting oldest"
            );
            old.mark_dead();
            self.metrics.record_eviction();
        }
        self.metrics.record_connect();

        info!(
            session_id = %handle.id,
            user_id = %user_id,
            username = %handle.username,
            "WebSocket session registered"
        );

        (handle, rx)
    }

    /// Unregisters a session. Returns `None` if it was already gone
    /// (for example after eviction).
    pub fn unregister(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        let handle = self.pool.remove(session_id)?;
        handle.mark_dead();
        self.metrics.record_disconnect();
        info!(
            session_id = %session_id,
            user_id = %handle.user_id,
            "WebSocket session unregistered"
        );
        Some(handle)
    }

    /// Delivers `message` to every session whose user is in `audience`.
    ///
    /// Returns the number of sessions the frame was queued on.
    pub fn broadcast(&self, message: &OutboundMessage, audience: &Audience) -> usize {
        let targets = match audience {
            Audience::Only(users) => users
                .iter()
                .flat_map(|user_id| self.pool.user_sessions(user_id))
                .collect::<Vec<_>>(),
            _ => self
                .pool
                .all_sessions()
                .into_iter()
                .filter(|session| audience.includes(&session.user_id))
                .collect(),
        };
        self.deliver(message, &targets)
    }

    /// Delivers `message` to every session of one user.
    pub fn send_to_user(&self, user_id: &UserId, message: &OutboundMessage) -> usize {
        let targets = self.pool.user_sessions(user_id);
        self.deliver(message, &targets)
    }

    /// Delivers `message` to one session.
    pub fn send_to_session(&self, session_id: &SessionId, message: &OutboundMessage) -> bool {
        match self.pool.get(session_id) {
            Some(handle) => self.deliver(message, std::slice::from_ref(&handle)) == 1,
            None => false,
        }
    }

    fn deliver(&self, message: &OutboundMessage, targets: &[Arc<SessionHandle>]) -> usize {
        let mut queued = 0u64;
        let mut dropped = 0u64;
        for session in targets {
            match session.send(message.clone()) {
                SendOutcome::Queued => queued += 1,
                SendOutcome::Dropped => dropped += 1,
                SendOutcome::Closed => {
                    debug!(session_id = %session.id, "Skipping closed session");
                }
            }
        }
        self.metrics.record_sent(queued, dropped);
        debug!(
            kind = message.kind(),
            queued,
            dropped,
            "Outbound frame delivered"
        );
        queued as usize
    }

    /// Closes all sessions.
    pub fn close_all(&self) {
        let all = self.pool.drain();
        for session in &all {
            session.mark_dead();
            self.metrics.record_disconnect();
        }
        info!(count = all.len(), "All sessions closed");
    }

    /// Returns the total session count.
    pub fn session_count(&self) -> usize {
        self.pool.session_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Returns all connected user IDs.
    pub fn connected_user_ids(&self) -> Vec<UserId> {
        self.pool.connected_user_ids()
    }

    /// Checks if a user has at least one open session.
    pub fn is_user_connected(&self, user_id: &UserId) -> bool {
        !self.pool.user_sessions(user_id).is_empty()
    }

    /// Returns the realtime configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}
