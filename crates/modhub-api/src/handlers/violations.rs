//! Violation review handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use modhub_core::types::ViolationId;
use modhub_entity::violation::Violation;

use crate::dto::request::ViolationQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::ActingUser;
use crate::state::AppState;

/// GET /api/violations?reviewed= (admin)
pub async fn list(
    State(state): State<AppState>,
    actor: ActingUser,
    Query(query): Query<ViolationQuery>,
) -> Result<Json<ApiResponse<Vec<Violation>>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.hub.list_violations(&actor, query.reviewed)?,
    )))
}

/// POST /api/violations/{id}/review (admin)
pub async fn review(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<ViolationId>,
) -> Result<Json<ApiResponse<Violation>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.review_violation(&actor, &id)?)))
}
