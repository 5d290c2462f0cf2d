//! Function-style endpoints that trigger the two scraping pipelines.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use super::super::AppState;
use super::helpers::{optional_string, parse_json_object, status_for};
use crate::error::HarvestError;
use crate::services::IngestSummary;

/// Keys accepted for the issue token, in order of preference.
const TOKEN_KEYS: [&str; 3] = ["token", "selectedValue", "selectedDate"];

/// Pull the issue token out of a crawl request body.
pub fn token_from_body(body: &Map<String, Value>) -> Result<String, HarvestError> {
    for key in TOKEN_KEYS {
        if let Some(token) = optional_string(body, key)? {
            if !token.trim().is_empty() {
                return Ok(token.trim().to_string());
            }
        }
    }
    Err(HarvestError::Validation("token is required".to_string()))
}

async fn refresh_catalog(state: &AppState, body: &Bytes) -> Result<usize, HarvestError> {
    let body = parse_json_object(body)?;
    let date_hint = optional_string(&body, "dateHint")?;
    state
        .catalog_service()?
        .refresh(date_hint.as_deref())
        .await
}

async fn ingest_issue(state: &AppState, body: &Bytes) -> Result<IngestSummary, HarvestError> {
    let body = parse_json_object(body)?;
    let token = token_from_body(&body)?;
    state.ingest_service()?.ingest(&token).await
}

/// POST /functions/scrape-dates
pub async fn scrape_dates(State(state): State<AppState>, body: Bytes) -> Response {
    match refresh_catalog(&state, &body).await {
        Ok(count) => Json(json!({ "success": true, "count": count })).into_response(),
        Err(e) => {
            tracing::warn!("Catalog refresh failed: {}", e);
            (
                status_for(&e),
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// POST /functions/crawl-pdfs
pub async fn crawl_pdfs(State(state): State<AppState>, body: Bytes) -> Response {
    match ingest_issue(&state, &body).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "message": "PDF crawling completed successfully",
                "pdfCount": summary.processed,
                "processed": summary.processed,
                "discovered": summary.discovered,
                "pdfs": summary.pdfs,
                "failed": summary.failed,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Crawl failed: {}", e);
            (
                status_for(&e),
                Json(json!({ "error": "Failed to crawl PDFs", "details": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_token_aliases() {
        assert_eq!(token_from_body(&body(json!({"token": " 12-2024 "}))).unwrap(), "12-2024");
        assert_eq!(token_from_body(&body(json!({"selectedValue": "a"}))).unwrap(), "a");
        assert_eq!(token_from_body(&body(json!({"selectedDate": "b"}))).unwrap(), "b");
        assert_eq!(
            token_from_body(&body(json!({"token": "", "selectedDate": "b"}))).unwrap(),
            "b"
        );
    }

    #[test]
    fn test_token_validation() {
        for bad in [json!({}), json!({"token": "   "}), json!({"token": 12})] {
            assert!(matches!(
                token_from_body(&body(bad)),
                Err(HarvestError::Validation(_))
            ));
        }
    }
}
