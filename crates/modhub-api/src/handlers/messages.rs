//! Chat history and REST message submission.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use modhub_entity::message::Message;

use modhub_service::hub::Accepted;

use crate::dto::request::{HistoryQuery, SendMessageRequest, validate_body};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::ActingUser;
use crate::state::AppState;

/// GET /api/messages?limit=
pub async fn history(
    State(state): State<AppState>,
    actor: ActingUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<Message>>>, ApiError> {
    let messages = state.hub.history(&actor, query.limit).await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// POST /api/messages
///
/// Runs the same policy as a socket frame. A blocked message answers 422;
/// the violation is recorded regardless. A message held for link review
/// answers 202 with its link checks.
pub async fn send_message(
    State(state): State<AppState>,
    actor: ActingUser,
    Json(req): Json<SendMessageRequest>,
) -> Result<Response, ApiError> {
    validate_body(&req)?;
    let accepted = state
        .hub
        .submit_message(&actor, &req.text)
        .await?
        .into_result()?;
    Ok(match accepted {
        Accepted::Delivered(message) => {
            (StatusCode::CREATED, Json(ApiResponse::ok(message))).into_response()
        }
        Accepted::Held(checks) => {
            (StatusCode::ACCEPTED, Json(ApiResponse::ok(checks))).into_response()
        }
    })
}
