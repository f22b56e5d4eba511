//! Append-only message log that defines the single global message order.

use tokio::sync::Mutex;

use modhub_entity::message::Message;

/// Accepted messages in arrival order.
///
/// [`MessageLog::append_with`] runs the fan-out while the log is locked, so
/// the order in which sessions receive messages always matches the order
/// in the log. Fan-out only queues frames and never waits on a client.
#[derive(Debug)]
pub struct MessageLog {
    /// Messages, oldest first.
    messages: Mutex<Vec<Message>>,
    /// Retained history length; older messages are discarded.
    capacity: usize,
}

impl MessageLog {
    /// Creates a log retaining at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    /// Appends `message` and calls `deliver` before releasing the lock.
    pub async fn append_with<R>(&self, message: Message, deliver: impl FnOnce(&Message) -> R) -> R {
        let mut messages = self.messages.lock().await;
        messages.push(message);
        if messages.len() > self.capacity {
            let excess = messages.len() - self.capacity;
            messages.drain(..excess);
        }
        let last = &messages[messages.len() - 1];
        deliver(last)
    }

    /// The most recent `limit` messages, oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<Message> {
        let messages = self.messages.lock().await;
        let start = messages.len().saturating_sub(limit);
        messages[start..].to_vec()
    }

    /// Number of retained messages.
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }
}
