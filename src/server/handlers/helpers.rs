//! Error mapping and body parsing shared by the handlers.

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::error::HarvestError;

/// HTTP status for an error kind.
pub fn status_for(err: &HarvestError) -> StatusCode {
    match err {
        HarvestError::Validation(_) => StatusCode::BAD_REQUEST,
        HarvestError::NotFound(_) => StatusCode::NOT_FOUND,
        HarvestError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        HarvestError::Fetch { .. }
        | HarvestError::Parse(_)
        | HarvestError::EmptyResult(_)
        | HarvestError::NoDocuments(_) => StatusCode::BAD_GATEWAY,
        HarvestError::Storage(_) | HarvestError::Persistence(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `{ "error": message }` with the mapped status.
pub fn error_response(err: &HarvestError) -> Response {
    if status_for(err).is_server_error() {
        tracing::error!("{}", err);
    }
    (
        status_for(err),
        Json(json!({ "error": err.to_string(), "kind": err.kind() })),
    )
        .into_response()
}

/// Parse an optional JSON object body. An empty body yields an empty map.
pub fn parse_json_object(body: &Bytes) -> Result<Map<String, Value>, HarvestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(HarvestError::Validation(
            "request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(HarvestError::Validation(format!("invalid JSON body: {}", e))),
    }
}

/// Optional string field; present but non-string values are rejected.
pub fn optional_string(map: &Map<String, Value>, key: &str) -> Result<Option<String>, HarvestError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(HarvestError::Validation(format!("{} must be a string", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&HarvestError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&HarvestError::NoDocuments("t".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&HarvestError::Timeout {
                what: "a".into(),
                secs: 1
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&StorageError::AlreadyExists("p".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_parse_json_object() {
        assert!(parse_json_object(&Bytes::from_static(b"")).unwrap().is_empty());
        assert!(parse_json_object(&Bytes::from_static(b"{\"a\":1}")).unwrap().contains_key("a"));
        assert!(parse_json_object(&Bytes::from_static(b"[1]")).is_err());
        assert!(parse_json_object(&Bytes::from_static(b"{oops")).is_err());
    }
}
