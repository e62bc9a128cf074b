use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{archive, batches, handlers, history, middleware::metrics_middleware, pages, progress};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config().storage.max_upload_bytes;

    Router::new()
        // UI pages
        .route("/", get(pages::index))
        .route("/progress", get(pages::progress_page))
        // Batch lifecycle
        .route("/start_download", post(batches::start_download))
        .route("/clear_status", post(batches::clear_status))
        // Progress and history
        .route("/get_progress", get(progress::get_progress))
        .route("/history", get(history::get_history))
        // Folder-scoped operations
        .route("/download_zip/{folder}", get(archive::download_zip))
        .route("/open_folder/{folder}", get(archive::open_folder))
        // Operational endpoints
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
