//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let sessions = &state.realtime.sessions;
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        sessions: sessions.session_count(),
        connected_users: sessions.user_count(),
        users: state.hub.directory().len(),
        pending_files: state.hub.files().pending().len(),
        realtime: state.realtime.metrics.snapshot(),
    }))
}
