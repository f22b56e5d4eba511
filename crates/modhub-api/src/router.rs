//! Route definitions for the ModHub HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at
//! `/ws`. The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the route table.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(user_routes())
        .merge(message_routes())
        .merge(file_routes())
        .merge(violation_routes())
        .merge(url_check_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

/// Registration, self-service, and user administration
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::register),
        )
        .route("/users/me", get(handlers::users::me))
        .route("/users/{id}", get(handlers::users::get_user))
        .route(
            "/users/{id}/violations",
            get(handlers::users::user_violations),
        )
        .route("/users/{id}/ban", post(handlers::users::ban))
        .route("/users/{id}/unban", post(handlers::users::unban))
        .route(
            "/users/{id}/reset-violations",
            post(handlers::users::reset_violations),
        )
        .route("/users/{id}/role", put(handlers::users::change_role))
}

/// Chat history and REST submission
fn message_routes() -> Router<AppState> {
    Router::new().route(
        "/messages",
        get(handlers::messages::history).post(handlers::messages::send_message),
    )
}

/// Upload, listings, and moderation decisions
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::files::list_all))
        .route("/files/upload", post(handlers::files::upload_file))
        .route("/files/approved", get(handlers::files::list_approved))
        .route("/files/mine", get(handlers::files::list_mine))
        .route("/files/pending", get(handlers::files::list_pending))
        .route("/files/{id}", get(handlers::files::get_file))
        .route("/files/{id}/approve", post(handlers::files::approve_file))
        .route("/files/{id}/reject", post(handlers::files::reject_file))
        .route("/files/{id}/scan", post(handlers::files::scan_file))
}

/// Violation review
fn violation_routes() -> Router<AppState> {
    Router::new()
        .route("/violations", get(handlers::violations::list))
        .route(
            "/violations/{id}/review",
            post(handlers::violations::review),
        )
}

/// Link review
fn url_check_routes() -> Router<AppState> {
    Router::new()
        .route("/url-checks", get(handlers::url_checks::list))
        .route("/url-checks/pending", get(handlers::url_checks::list_pending))
        .route(
            "/url-checks/{id}/mark-safe",
            post(handlers::url_checks::mark_safe),
        )
        .route(
            "/url-checks/{id}/mark-malicious",
            post(handlers::url_checks::mark_malicious),
        )
        .route("/url-checks/{id}/scan", post(handlers::url_checks::scan))
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
