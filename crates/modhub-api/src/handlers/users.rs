//! User registration and administration handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use modhub_core::types::UserId;
use modhub_entity::user::User;
use modhub_entity::violation::Violation;

use crate::dto::request::{ChangeRoleRequest, RegisterUserRequest, validate_body};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::ActingUser;
use crate::state::AppState;

type UserResponse = Json<ApiResponse<User>>;

/// POST /api/users
///
/// Open registration of a member account. Authentication of the caller is
/// the front end's concern.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, UserResponse), ApiError> {
    validate_body(&req)?;
    let display_name = req.display_name.as_deref().unwrap_or(&req.username);
    let user = state.hub.register_user(&req.username, display_name)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    actor: ActingUser,
) -> Result<UserResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.me(&actor)?)))
}

/// GET /api/users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    actor: ActingUser,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.list_users(&actor)?)))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<UserId>,
) -> Result<UserResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.get_user(&actor, &id)?)))
}

/// GET /api/users/{id}/violations (admin)
pub async fn user_violations(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<UserId>,
) -> Result<Json<ApiResponse<Vec<Violation>>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.user_violations(&actor, &id)?)))
}

/// POST /api/users/{id}/ban
pub async fn ban(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<UserId>,
) -> Result<UserResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.ban_user(&actor, &id)?)))
}

/// POST /api/users/{id}/unban
pub async fn unban(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<UserId>,
) -> Result<UserResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.unban_user(&actor, &id)?)))
}

/// POST /api/users/{id}/reset-violations
pub async fn reset_violations(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<UserId>,
) -> Result<UserResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.reset_violations(&actor, &id)?)))
}

/// PUT /api/users/{id}/role (super-admin)
pub async fn change_role(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<UserId>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<UserResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.change_role(&actor, &id, req.role)?)))
}
