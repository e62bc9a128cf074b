//! Folder-scoped operations: archive download and local folder opening.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use batchdl_core::resolve_under_root;

use super::{error_response, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OpenFolderResponse {
    pub status: &'static str,
    pub folder: String,
}

/// Serve the folder's archive as an attachment, creating it on first
/// request. An existing archive is served as-is, never rebuilt.
pub async fn download_zip(
    State(state): State<Arc<AppState>>,
    Path(folder): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let orchestrator = state.orchestrator();
    let dir = resolve_under_root(orchestrator.download_root(), &folder)
        .map_err(|e| error_response(e.into()))?;
    let zip_path = dir.with_extension("zip");

    if !zip_path.exists() {
        orchestrator
            .archive_folder(&folder)
            .await
            .map_err(error_response)?;
    }

    // Archives are unbounded in size; stream instead of buffering.
    let file = tokio::fs::File::open(&zip_path).await.map_err(|e| {
        warn!("Failed to open archive {:?}: {}", zip_path, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("failed to read archive: {}", e),
            }),
        )
    })?;
    let len = file
        .metadata()
        .await
        .map_err(|e| {
            warn!("Failed to stat archive {:?}: {}", zip_path, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("failed to read archive: {}", e),
                }),
            )
        })?
        .len();

    let disposition = format!("attachment; filename=\"{}.zip\"", folder);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}

/// Open the batch folder in the local file manager.
pub async fn open_folder(
    State(state): State<Arc<AppState>>,
    Path(folder): Path<String>,
) -> Result<Json<OpenFolderResponse>, (StatusCode, Json<ErrorResponse>)> {
    let dir = state
        .orchestrator()
        .resolve_folder(&folder)
        .await
        .map_err(error_response)?;

    let mut command = if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        std::process::Command::new("explorer")
    } else {
        std::process::Command::new("xdg-open")
    };

    command.arg(&dir).spawn().map_err(|e| {
        warn!("Failed to open folder {:?}: {}", dir, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("failed to open folder: {}", e),
            }),
        )
    })?;

    info!("Opened folder {:?}", dir);
    Ok(Json(OpenFolderResponse {
        status: "success",
        folder,
    }))
}
