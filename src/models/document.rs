//! Ingested gazette PDF records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow label of a document.
///
/// Nothing in the ingestion pipeline drives these transitions; documents are
/// created `Pending` and the "parse" action flips them to `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status filter used by the document table: `all` or a single status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(DocumentStatus),
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "" | "all" => Some(Self::All),
            other => DocumentStatus::from_str(other).map(Self::Only),
        }
    }

    pub fn matches(&self, status: DocumentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(s) => *s == status,
        }
    }
}

/// Metadata row for one stored PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    /// Link text from the source page.
    pub name: String,
    pub status: DocumentStatus,
    /// Blob path; every non-null key has a blob behind it.
    pub storage_key: Option<String>,
    pub source_url: Option<String>,
    pub issue_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Create a freshly ingested, pending document.
    pub fn new_pending(
        name: String,
        storage_key: String,
        source_url: String,
        issue_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            status: DocumentStatus::Pending,
            storage_key: Some(storage_key),
            source_url: Some(source_url),
            issue_token: Some(issue_token),
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive substring match on the name.
    pub fn name_matches(&self, needle: &str) -> bool {
        needle.is_empty() || self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}
