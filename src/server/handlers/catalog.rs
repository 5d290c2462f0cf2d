//! Catalog listing endpoint.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use super::helpers::error_response;
use crate::error::HarvestError;

/// GET /api/catalog
pub async fn list_catalog(State(state): State<AppState>) -> Response {
    match state.ctx.catalog().list().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => error_response(&HarvestError::from(e)),
    }
}
