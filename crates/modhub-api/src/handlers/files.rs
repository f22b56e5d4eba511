//! File upload, listing, and moderation decision handlers.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use bytes::Bytes;

use modhub_core::error::AppError;
use modhub_core::types::FileId;
use modhub_entity::file::{FileUpload, ModerationMode};
use modhub_service::file::UploadRequest;

use crate::dto::request::UploadQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::ActingUser;
use crate::state::AppState;

type FileResponse = Json<ApiResponse<FileUpload>>;
type FileListResponse = Json<ApiResponse<Vec<FileUpload>>>;

/// POST /api/files/upload?moderation_mode= (multipart)
///
/// Expects a `file` part; an optional `moderation_mode` text part overrides
/// the query parameter.
pub async fn upload_file(
    State(state): State<AppState>,
    actor: ActingUser,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, FileResponse), ApiError> {
    let mut mode = query.moderation_mode;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "moderation_mode" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                mode = Some(text);
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                content_type = field.content_type().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let filename = file_name.ok_or_else(|| AppError::validation("file is required"))?;
    let data = data.ok_or_else(|| AppError::validation("file data is required"))?;
    let moderation_mode = match mode.as_deref().map(str::trim) {
        None | Some("") => ModerationMode::default(),
        Some(raw) => raw.parse::<ModerationMode>()?,
    };

    let file = state
        .hub
        .submit_file_upload(
            &actor,
            UploadRequest {
                filename,
                content_type,
                data,
                moderation_mode,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// GET /api/files (admin)
pub async fn list_all(
    State(state): State<AppState>,
    actor: ActingUser,
) -> Result<FileListResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.all_files(&actor)?)))
}

/// GET /api/files/approved
pub async fn list_approved(
    State(state): State<AppState>,
    actor: ActingUser,
) -> Result<FileListResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.approved_files(&actor)?)))
}

/// GET /api/files/mine
pub async fn list_mine(
    State(state): State<AppState>,
    actor: ActingUser,
) -> Result<FileListResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.my_files(&actor)?)))
}

/// GET /api/files/pending (admin)
pub async fn list_pending(
    State(state): State<AppState>,
    actor: ActingUser,
) -> Result<FileListResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.pending_files(&actor)?)))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<FileId>,
) -> Result<FileResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.get_file(&actor, &id)?)))
}

/// POST /api/files/{id}/approve
pub async fn approve_file(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<FileId>,
) -> Result<FileResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.approve_file(&actor, &id).await?)))
}

/// POST /api/files/{id}/reject
pub async fn reject_file(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<FileId>,
) -> Result<FileResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.reject_file(&actor, &id).await?)))
}

/// POST /api/files/{id}/scan
///
/// Waits for the scanner (bounded by the scan timeout). A failed scan
/// answers 503 and leaves the file pending.
pub async fn scan_file(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<FileId>,
) -> Result<FileResponse, ApiError> {
    Ok(Json(ApiResponse::ok(state.hub.scan_file(&actor, &id).await?)))
}
