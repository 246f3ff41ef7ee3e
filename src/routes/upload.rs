//! Upload Routes
//!
//! `POST /api/upload` accepts a multipart body with one or more files and
//! answers with one result per file, in the order the files were sent.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::upload::{UploadItem, UploadResponse, DEFAULT_CONTENT_TYPE};

/// Create the upload router
pub fn router(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(upload_pages))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// Store every file part of the request
///
/// Any part carrying a filename is treated as a page; other form fields are
/// ignored. The file extension is not checked here.
async fn upload_pages(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut items = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read upload: {}", e))
    })? {
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            tracing::debug!(field = ?field.name(), "Ignoring non-file field");
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file data: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        tracing::debug!(file_name = %file_name, bytes = bytes.len(), "Received file");
        items.push(UploadItem::new(file_name, bytes, content_type));
    }

    if items.is_empty() {
        tracing::warn!("No file parts found in multipart upload");
        return Err(AppError::BadRequest("No files provided".to_string()));
    }

    let results = state.coordinator().submit(items).await;

    for result in results.iter().filter(|r| r.is_success()) {
        state.resolver().register(&result.slug).await;
    }

    Ok(Json(UploadResponse::from(results)))
}
