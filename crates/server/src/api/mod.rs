pub mod archive;
pub mod batches;
pub mod handlers;
pub mod history;
pub mod middleware;
pub mod pages;
pub mod progress;
pub mod routes;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use batchdl_core::{OrchestratorError, StorageError};

/// Error response body shared by all handlers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map an orchestration error onto an HTTP response.
///
/// Validation failures are the client's fault (400), unknown folders are
/// 404, and traversal attempts are refused with 403.
pub fn error_response(err: OrchestratorError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        OrchestratorError::EmptyBatch
        | OrchestratorError::InvalidUrl(_)
        | OrchestratorError::CookieRequired(_)
        | OrchestratorError::WorkerCount { .. } => StatusCode::BAD_REQUEST,
        OrchestratorError::FolderNotFound(_) => StatusCode::NOT_FOUND,
        OrchestratorError::Storage(StorageError::OutsideRoot(_)) => StatusCode::FORBIDDEN,
        OrchestratorError::Storage(_) | OrchestratorError::Archive(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
