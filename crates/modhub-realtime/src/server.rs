//! Top-level real-time engine that ties together the session subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use modhub_core::config::RealtimeConfig;

use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::registry::SessionRegistry;
use crate::metrics::EngineMetrics;

/// Central real-time engine shared by the hub and the socket handlers.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Session registry.
    pub sessions: Arc<SessionRegistry>,
    /// Metrics collector.
    pub metrics: Arc<EngineMetrics>,
    /// Configuration.
    config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("sessions", &self.sessions.session_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine.
    pub fn new(config: RealtimeConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let metrics = Arc::new(EngineMetrics::new());
        let sessions = Arc::new(SessionRegistry::new(config.clone(), metrics.clone()));

        info!(
            max_sessions_per_user = config.max_sessions_per_user,
            queue_size = config.session_queue_size,
            "Real-time engine initialized"
        );

        Self {
            sessions,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Realtime configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Heartbeat settings derived from the configuration.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals every socket loop to stop and closes all sessions.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.sessions.close_all();
        info!("Real-time engine shut down");
    }
}
