//! Individual WebSocket session handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, RwLock, mpsc};

use modhub_core::types::{SessionId, UserId};

use crate::message::types::OutboundMessage;

/// Outcome of queueing a frame on one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame was queued.
    Queued,
    /// The queue was full; the frame was dropped for this session only.
    Dropped,
    /// The session is gone.
    Closed,
}

/// A handle to a single WebSocket session.
///
/// Holds the sender half of the session's bounded outbound queue plus
/// metadata about the connected user. The user's role is deliberately not
/// cached here; it is looked up at decision time.
#[derive(Debug)]
pub struct SessionHandle {
    /// Unique session ID
    pub id: SessionId,
    /// User who owns this session
    pub user_id: UserId,
    /// Username (cached for logging)
    pub username: String,
    /// Sender for outbound messages
    sender: mpsc::Sender<OutboundMessage>,
    /// When the session was established
    pub connected_at: DateTime<Utc>,
    /// Last inbound frame or pong
    last_seen: RwLock<DateTime<Utc>>,
    /// Whether the session is still alive
    alive: AtomicBool,
    /// Woken when the session is marked dead so the socket loop can exit
    closed: Notify,
}

impl SessionHandle {
    /// Create a new session handle
    pub fn new(user_id: UserId, username: String, sender: mpsc::Sender<OutboundMessage>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            user_id,
            username,
            sender,
            connected_at: now,
            last_seen: RwLock::new(now),
            alive: AtomicBool::new(true),
            closed: Notify::new(),
        }
    }

    /// Queue an outbound message without waiting.
    ///
    /// Never blocks, so callers may fan out while holding a lock that
    /// defines message order.
    pub fn send(&self, msg: OutboundMessage) -> SendOutcome {
        if !self.is_alive() {
            return SendOutcome::Closed;
        }
        match self.sender.try_send(msg) {
            Ok(()) => SendOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(session_id = %self.id, "Session send buffer full, dropping message");
                SendOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                SendOutcome::Closed
            }
        }
    }

    /// Check if session is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark session as dead and wake the socket loop
    pub fn mark_dead(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            self.closed.notify_one();
        }
    }

    /// Resolves once the session has been marked dead.
    pub async fn closed(&self) {
        if !self.is_alive() {
            return;
        }
        self.closed.notified().await;
    }

    /// Record inbound activity (any frame, including pongs)
    pub async fn touch(&self) {
        let mut seen = self.last_seen.write().await;
        *seen = Utc::now();
    }

    /// Last inbound activity
    pub async fn last_seen(&self) -> DateTime<Utc> {
        *self.last_seen.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::OutboundMessage;

    #[tokio::test]
    async fn test_full_queue_drops_without_killing_session() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = SessionHandle::new(UserId::new(), "alice".into(), tx);
        assert_eq!(handle.send(OutboundMessage::info("one")), SendOutcome::Queued);
        assert_eq!(handle.send(OutboundMessage::info("two")), SendOutcome::Dropped);
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn test_closed_receiver_marks_dead() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = SessionHandle::new(UserId::new(), "bob".into(), tx);
        assert_eq!(handle.send(OutboundMessage::info("hi")), SendOutcome::Closed);
        assert!(!handle.is_alive());
        // resolves immediately once dead
        handle.closed().await;
    }

    #[tokio::test]
    async fn test_mark_dead_wakes_waiter() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = std::sync::Arc::new(SessionHandle::new(UserId::new(), "carol".into(), tx));
        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.closed().await })
        };
        tokio::task::yield_now().await;
        handle.mark_dead();
        waiter.await.expect("waiter finished");
    }
}
