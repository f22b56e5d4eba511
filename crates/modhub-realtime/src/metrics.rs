//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Total frames queued to sessions
    pub messages_sent: AtomicU64,
    /// Total frames dropped because a session queue was full
    pub messages_dropped: AtomicU64,
    /// Total inbound frames received
    pub messages_received: AtomicU64,
    /// Total sessions established
    pub connections_total: AtomicU64,
    /// Sessions currently active
    pub connections_active: AtomicU64,
    /// Sessions evicted by the per-user limit
    pub sessions_evicted: AtomicU64,
}

impl EngineMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new session
    pub fn record_connect(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session leaving the pool
    pub fn record_disconnect(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Record an eviction
    pub fn record_eviction(&self) {
        self.sessions_evicted.fetch_add(1, Ordering::Relaxed);
        self.record_disconnect();
    }

    /// Record fan-out results
    pub fn record_sent(&self, queued: u64, dropped: u64) {
        self.messages_sent.fetch_add(queued, Ordering::Relaxed);
        self.messages_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Record an inbound frame
    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            sessions_evicted: self.sessions_evicted.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total frames queued to sessions
    pub messages_sent: u64,
    /// Total frames dropped on full queues
    pub messages_dropped: u64,
    /// Total inbound frames received
    pub messages_received: u64,
    /// Total sessions ever established
    pub connections_total: u64,
    /// Currently active sessions
    pub connections_active: u64,
    /// Sessions evicted by the per-user limit
    pub sessions_evicted: u64,
}
