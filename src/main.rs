//! ModHub Server: moderation-aware messaging hub
//!
//! Main entry point that wires all crates together and starts the server.

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use modhub_api::{AppState, build_app};
use modhub_core::config::AppConfig;

#[tokio::main]
async fn main() {
    let env = std::env::var("MODHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = format!("{e:#}"), "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting ModHub v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let bootstrap = config.bootstrap.clone();

    // ── Step 1: Realtime engine and hub ──────────────────────────
    let state = AppState::from_config(config).context("Failed to initialize hub")?;

    // ── Step 2: Seed the super-admin ─────────────────────────────
    let root = state
        .hub
        .bootstrap_super_admin(&bootstrap)
        .context("Failed to seed super-admin")?;
    tracing::info!(
        user_id = %root.id,
        username = %root.username,
        "Super-admin ready"
    );

    // ── Step 3: Build and start HTTP server ──────────────────────
    let hub = state.hub.clone();
    let realtime = state.realtime.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("ModHub server listening on {}", addr);

    // ── Step 4: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            realtime.shutdown();
        })
        .await
        .context("Server error")?;

    // ── Step 5: Let accepted scans finish ────────────────────────
    if !hub.drain_scans(grace).await {
        tracing::warn!("Some scans did not finish before shutdown; their files stay pending");
    }

    tracing::info!("ModHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
