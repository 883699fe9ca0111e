//! Admin handlers for media hidden when assets were deleted.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use gallery_core::error::CoreError;
use gallery_core::storage::StorageError;
use gallery_core::types::DbId;
use gallery_db::repositories::HiddenMediaRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/hidden-media/{id}/unhide
///
/// Restore a hidden file. A file that no longer exists in storage marks the
/// log entry `deleted_from_source`; a file that is not hidden is left alone.
pub async fn unhide(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = HiddenMediaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Hidden media file", id))?;

    let entry = match state.storage.unhide(&entry.file_name).await {
        Ok(()) => {
            tracing::info!(
                hidden_media_id = id,
                user_id = admin.user_id,
                file_name = %entry.file_name,
                "Hidden media restored",
            );
            entry
        }
        Err(StorageError::NotPresent(_)) => {
            tracing::warn!(
                hidden_media_id = id,
                file_name = %entry.file_name,
                "File not present in storage, marking as deleted",
            );
            HiddenMediaRepo::mark_deleted_from_source(&state.pool, id)
                .await?
                .ok_or_else(|| CoreError::not_found("Hidden media file", id))?
        }
        Err(StorageError::NotHidden(_)) => {
            tracing::info!(
                hidden_media_id = id,
                file_name = %entry.file_name,
                "File already not hidden, nothing to do",
            );
            entry
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(DataResponse { data: entry }))
}
