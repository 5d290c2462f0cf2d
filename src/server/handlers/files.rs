//! Serves stored blobs; public URLs point here.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::super::AppState;
use crate::error::StorageError;

/// GET /files/{bucket}/{path}
pub async fn serve_file(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let bucket_prefix = format!("{}/", state.blobs.bucket());
    let Some(key) = path.strip_prefix(&bucket_prefix) else {
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    };

    let content = match state.blobs.read(key).await {
        Ok(c) => c,
        Err(StorageError::NotFound(_)) | Err(StorageError::InvalidPath(_)) => {
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
        Err(e) => {
            tracing::error!("Failed to read blob {}: {}", key, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file").into_response();
        }
    };

    let mime = mime_guess::from_path(key).first_or_octet_stream().to_string();

    ([(header::CONTENT_TYPE, mime)], content).into_response()
}
