//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use modhub_core::config::AppConfig;
use modhub_core::error::AppError;
use modhub_realtime::RealtimeEngine;
use modhub_service::Hub;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Moderation hub
    pub hub: Hub,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wires the realtime engine and the hub from configuration.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone()));
        let hub = Hub::from_config(&config, realtime.sessions.clone())?;
        Ok(Self::new(config, hub, realtime))
    }

    /// Assembles state from already constructed parts.
    pub fn new(config: AppConfig, hub: Hub, realtime: Arc<RealtimeEngine>) -> Self {
        Self {
            config: Arc::new(config),
            hub,
            realtime,
            started_at: Instant::now(),
        }
    }
}
