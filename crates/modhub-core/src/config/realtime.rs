//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Bounded outbound queue length per session. A full queue drops frames
    /// for that session only.
    #[serde(default = "default_session_queue_size")]
    pub session_queue_size: usize,
    /// Maximum concurrent sessions per user. The oldest session is evicted
    /// when a new one would exceed this.
    #[serde(default = "default_max_sessions_per_user")]
    pub max_sessions_per_user: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Seconds without a pong before a session is considered dead.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Maximum size of a single inbound text frame in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            session_queue_size: default_session_queue_size(),
            max_sessions_per_user: default_max_sessions_per_user(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

fn default_session_queue_size() -> usize {
    256
}

fn default_max_sessions_per_user() -> usize {
    5
}

fn default_ping_interval() -> u64 {
    30
}

fn default_ping_timeout() -> u64 {
    90
}

fn default_max_frame_bytes() -> usize {
    64 * 1024
}
