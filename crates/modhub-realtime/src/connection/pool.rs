//! Session pool: tracks all active sessions indexed by user ID.

use std::sync::Arc;

use dashmap::DashMap;

use modhub_core::types::{SessionId, UserId};

use super::handle::SessionHandle;

/// Thread-safe pool of all active WebSocket sessions.
#[derive(Debug, Default)]
pub struct SessionPool {
    /// User ID → sessions in connection order (one user can have several).
    by_user: DashMap<UserId, Vec<Arc<SessionHandle>>>,
    /// Session ID → handle for direct lookup.
    by_id: DashMap<SessionId, Arc<SessionHandle>>,
}

impl SessionPool {
    /// Creates a new empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session, first evicting the oldest sessions of the same user
    /// so that at most `max_per_user` remain. Returns the evicted handles.
    pub fn add_bounded(
        &self,
        handle: Arc<SessionHandle>,
        max_per_user: usize,
    ) -> Vec<Arc<SessionHandle>> {
        let mut evicted = Vec::new();
        {
            let mut sessions = self.by_user.entry(handle.user_id).or_default();
            let keep = max_per_user.saturating_sub(1);
            while sessions.len() > keep {
                evicted.push(sessions.remove(0));
            }
            sessions.push(handle.clone());
        }
        for old in &evicted {
            self.by_id.remove(&old.id);
        }
        self.by_id.insert(handle.id, handle);
        evicted
    }

    /// Removes a session from the pool.
    pub fn remove(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        let (_, handle) = self.by_id.remove(session_id)?;
        self.by_user.remove_if_mut(&handle.user_id, |_, sessions| {
            sessions.retain(|s| s.id != *session_id);
            sessions.is_empty()
        });
        Some(handle)
    }

    /// Gets all sessions for a user.
    pub fn user_sessions(&self, user_id: &UserId) -> Vec<Arc<SessionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Gets a specific session by ID.
    pub fn get(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.by_id.get(session_id).map(|entry| entry.value().clone())
    }

    /// Returns total number of active sessions.
    pub fn session_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Returns all session handles.
    pub fn all_sessions(&self) -> Vec<Arc<SessionHandle>> {
        self.by_id.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Returns all connected user IDs.
    pub fn connected_user_ids(&self) -> Vec<UserId> {
        self.by_user.iter().map(|entry| *entry.key()).collect()
    }

    /// Removes every session.
    pub fn drain(&self) -> Vec<Arc<SessionHandle>> {
        let all = self.all_sessions();
        self.by_id.clear();
        self.by_user.clear();
        all
    }
}
