//! Link review handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use modhub_core::types::UrlCheckId;
use modhub_entity::url_check::UrlCheck;

use crate::dto::request::UrlCheckQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::ActingUser;
use crate::state::AppState;

/// GET /api/url-checks?status= (admin)
pub async fn list(
    State(state): State<AppState>,
    actor: ActingUser,
    Query(query): Query<UrlCheckQuery>,
) -> Result<Json<ApiResponse<Vec<UrlCheck>>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.hub.url_checks(&actor, query.status)?,
    )))
}

/// GET /api/url-checks/pending (admin)
pub async fn list_pending(
    State(state): State<AppState>,
    actor: ActingUser,
) -> Result<Json<ApiResponse<Vec<UrlCheck>>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.pending_url_checks(&actor)?)))
}

/// POST /api/url-checks/{id}/mark-safe (admin)
pub async fn mark_safe(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<UrlCheckId>,
) -> Result<Json<ApiResponse<UrlCheck>>, ApiError> {
    let check = state.hub.mark_url_safe(&actor, &id).await?;
    Ok(Json(ApiResponse::ok(check)))
}

/// POST /api/url-checks/{id}/mark-malicious (admin)
pub async fn mark_malicious(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<UrlCheckId>,
) -> Result<Json<ApiResponse<UrlCheck>>, ApiError> {
    let check = state.hub.mark_url_malicious(&actor, &id).await?;
    Ok(Json(ApiResponse::ok(check)))
}

/// POST /api/url-checks/{id}/scan (admin)
///
/// Waits for the reputation lookup. Scanner failures answer 503 and leave
/// the check open.
pub async fn scan(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<UrlCheckId>,
) -> Result<Json<ApiResponse<UrlCheck>>, ApiError> {
    let check = state.hub.scan_url_check(&actor, &id).await?;
    Ok(Json(ApiResponse::ok(check)))
}
