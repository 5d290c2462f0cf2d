//! Document table endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use super::helpers::{error_response, optional_string, parse_json_object};
use super::types::{DeleteResponse, DocumentsQuery, PreviewResponse};
use crate::error::HarvestError;
use crate::models::StatusFilter;
use crate::services::{DocumentFilter, PageSize};

fn build_filter(name: Option<String>, status: Option<&str>) -> Result<DocumentFilter, HarvestError> {
    let status = match status {
        Some(s) => StatusFilter::parse(s)
            .ok_or_else(|| HarvestError::Validation(format!("unknown status filter '{}'", s)))?,
        None => StatusFilter::All,
    };
    Ok(DocumentFilter {
        name: name.filter(|n| !n.trim().is_empty()),
        status,
    })
}

/// GET /api/documents
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentsQuery>,
) -> Response {
    let query = build_filter(params.name, params.status.as_deref()).and_then(|filter| {
        let size = PageSize::from_limit(params.limit.unwrap_or(10))?;
        Ok((filter, size))
    });
    let (filter, size) = match query {
        Ok(q) => q,
        Err(e) => return error_response(&e),
    };

    match state
        .document_service()
        .list(&filter, params.page.unwrap_or(1), size)
        .await
    {
        Ok(page) => Json(page).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/documents/:id/preview
pub async fn preview_document(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.document_service().preview_url(&id).await {
        Ok(url) => Json(PreviewResponse { url }).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/documents/:id/parse
pub async fn parse_document(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.document_service().mark_processing(&id).await {
        Ok(doc) => Json(doc).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/documents/:id
pub async fn delete_document(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.document_service().delete(&id).await {
        Ok(()) => Json(DeleteResponse { id, deleted: true }).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/documents/bulk-delete
pub async fn bulk_delete_documents(State(state): State<AppState>, body: Bytes) -> Response {
    let filter = parse_json_object(&body).and_then(|body| {
        let name = optional_string(&body, "name")?;
        let status = optional_string(&body, "status")?;
        build_filter(name, status.as_deref())
    });
    let filter = match filter {
        Ok(f) => f,
        Err(e) => return error_response(&e),
    };

    match state.document_service().bulk_delete(&filter).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(&e),
    }
}
