//! Response DTOs.

use serde::{Deserialize, Serialize};

use modhub_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
    /// Live WebSocket sessions.
    pub sessions: usize,
    /// Distinct connected users.
    pub connected_users: usize,
    /// Registered users.
    pub users: usize,
    /// Files awaiting a decision.
    pub pending_files: usize,
    /// Engine counters.
    pub realtime: MetricsSnapshot,
}
