//! Batch submission and reset handlers.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use batchdl_core::SubmitRequest;

use super::{error_response, ErrorResponse};
use crate::state::AppState;

/// Response for a started batch.
#[derive(Debug, Serialize)]
pub struct StartDownloadResponse {
    pub status: &'static str,
    pub task_ids: Vec<batchdl_core::TaskId>,
    pub folder: String,
}

#[derive(Debug, Serialize)]
pub struct ClearStatusResponse {
    pub status: &'static str,
}

/// Start a batch from a multipart form submission.
///
/// Recognized fields: `urls` (newline separated), `folder`,
/// `filename_pattern`, `parallel_downloads`, `auto_zip`, `skip_invalid`
/// and an optional `cookie_file` upload.
pub async fn start_download(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StartDownloadResponse>), (StatusCode, Json<ErrorResponse>)> {
    let mut request = SubmitRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "urls" => {
                let text = field.text().await.map_err(bad_request)?;
                request.urls = text.lines().map(str::to_string).collect();
            }
            "folder" => {
                let text = field.text().await.map_err(bad_request)?;
                if !text.trim().is_empty() {
                    request.folder = Some(text);
                }
            }
            "filename_pattern" => {
                let text = field.text().await.map_err(bad_request)?;
                if !text.trim().is_empty() {
                    request.filename_template = Some(text);
                }
            }
            "parallel_downloads" => {
                let text = field.text().await.map_err(bad_request)?;
                if !text.trim().is_empty() {
                    let workers = text.trim().parse::<usize>().map_err(|_| {
                        bad_request(format!("parallel_downloads is not a number: {}", text))
                    })?;
                    request.workers = Some(workers);
                }
            }
            "auto_zip" => {
                let text = field.text().await.map_err(bad_request)?;
                request.auto_archive = checkbox_checked(&text);
            }
            "skip_invalid" => {
                let text = field.text().await.map_err(bad_request)?;
                request.skip_invalid = checkbox_checked(&text);
            }
            "cookie_file" => {
                let original_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_request)?;
                if !bytes.is_empty() {
                    let path = save_cookie_upload(&state, original_name.as_deref(), &bytes)
                        .await
                        .map_err(|e| {
                            warn!("Failed to persist cookie upload: {}", e);
                            internal_error("failed to store cookie file")
                        })?;
                    request.cookie_file = Some(path);
                }
            }
            other => {
                warn!("Ignoring unknown form field '{}'", other);
            }
        }
    }

    let handle = state
        .orchestrator()
        .start_batch(request)
        .await
        .map_err(error_response)?;

    info!(
        "Accepted batch '{}' with {} tasks",
        handle.folder,
        handle.task_ids.len()
    );
    Ok((
        StatusCode::ACCEPTED,
        Json(StartDownloadResponse {
            status: "started",
            task_ids: handle.task_ids,
            folder: handle.folder,
        }),
    ))
}

/// Reset the live task view and history.
pub async fn clear_status(State(state): State<Arc<AppState>>) -> Json<ClearStatusResponse> {
    state.orchestrator().clear().await;
    Json(ClearStatusResponse { status: "cleared" })
}

fn checkbox_checked(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

/// Persist an uploaded credential file under the upload root with a
/// unique, sanitized name.
async fn save_cookie_upload(
    state: &AppState,
    original_name: Option<&str>,
    bytes: &[u8],
) -> std::io::Result<PathBuf> {
    let upload_root = &state.config().storage.upload_root;
    tokio::fs::create_dir_all(upload_root).await?;

    let safe_name = sanitize_upload_name(original_name.unwrap_or("cookies.txt"));
    let path = upload_root.join(format!("{}_{}", uuid::Uuid::new_v4(), safe_name));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Strip any path components and odd characters from an upload name.
fn sanitize_upload_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("cookies.txt");
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() {
        "cookies.txt".to_string()
    } else {
        cleaned
    }
}

fn bad_request(err: impl ToString) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn internal_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
