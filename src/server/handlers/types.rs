//! Request and response types for the management API.

use serde::{Deserialize, Serialize};

/// Query parameters for the document table.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentsQuery {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// all, pending, processing, completed or failed.
    pub status: Option<String>,
    /// Page number (1-indexed)
    pub page: Option<usize>,
    /// 10, 25, 50, 100 or -1 for all rows
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: String,
    pub deleted: bool,
}
