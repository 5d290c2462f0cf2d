//! Error taxonomy for the catalog and ingestion pipelines.

use thiserror::Error;

/// Errors raised by the scraping pipelines and the management operations.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The source site could not be reached or answered with a non-2xx status.
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
    /// Expected markup structure is missing from the page.
    #[error("Parse error: {0}")]
    Parse(String),
    /// The selection widget exists but yields no usable options.
    #[error("No options found in widget '{0}'")]
    EmptyResult(String),
    /// A render-based wait ran out of time.
    #[error("Timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },
    /// The issue listing advertises no PDF links.
    #[error("No PDF links found for issue '{0}'")]
    NoDocuments(String),
    /// Blob upload, read or removal failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// Row insert, update or delete failed.
    #[error("Database error: {0}")]
    Persistence(#[from] diesel::result::Error),
    /// Caller input is missing or malformed.
    #[error("Invalid request: {0}")]
    Validation(String),
    /// No document with the given id.
    #[error("Document not found: {0}")]
    NotFound(String),
}

impl HarvestError {
    /// Build a fetch error from anything displayable.
    pub fn fetch(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch_error",
            Self::Parse(_) => "parse_error",
            Self::EmptyResult(_) => "empty_result",
            Self::Timeout { .. } => "timeout",
            Self::NoDocuments(_) => "no_documents",
            Self::Storage(_) => "storage_error",
            Self::Persistence(_) => "persistence_error",
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
        }
    }
}

/// Blob storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob already exists: {0}")]
    AlreadyExists(String),
    #[error("Blob not found: {0}")]
    NotFound(String),
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = HarvestError> = std::result::Result<T, E>;
