//! Document management: the table view, preview, parse and deletion.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{HarvestError, Result};
use crate::models::{DocumentRecord, DocumentStatus, StatusFilter};
use crate::repository::DbContext;
use crate::storage::BlobStore;

/// Page sizes offered by the document table.
pub const PAGE_SIZES: [i64; 5] = [10, 25, 50, 100, -1];

/// Rows per page; `All` disables paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Rows(usize),
    All,
}

impl Default for PageSize {
    fn default() -> Self {
        Self::Rows(10)
    }
}

impl PageSize {
    /// Accepts 10, 25, 50, 100, or -1 for everything.
    pub fn from_limit(limit: i64) -> Result<Self> {
        match limit {
            -1 => Ok(Self::All),
            n if PAGE_SIZES.contains(&n) => Ok(Self::Rows(n as usize)),
            other => Err(HarvestError::Validation(format!(
                "limit must be one of 10, 25, 50, 100 or -1, got {}",
                other
            ))),
        }
    }

    pub fn as_limit(&self) -> i64 {
        match self {
            Self::Rows(n) => *n as i64,
            Self::All => -1,
        }
    }
}

/// Name and status filter shared by the listing and bulk delete.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub name: Option<String>,
    pub status: StatusFilter,
}

impl DocumentFilter {
    pub fn matches(&self, doc: &DocumentRecord) -> bool {
        self.status.matches(doc.status)
            && self.name.as_deref().map_or(true, |n| doc.name_matches(n.trim()))
    }
}

/// One page of the document table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    pub documents: Vec<DocumentRecord>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub limit: i64,
}

/// Counts from a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkDeleteOutcome {
    pub deleted: usize,
    pub failed: usize,
}

/// Slice `docs` into the requested page. Out-of-range pages clamp to the
/// nearest valid one.
pub fn paginate(docs: Vec<DocumentRecord>, page: usize, size: PageSize) -> DocumentPage {
    let total = docs.len();
    let (documents, page, total_pages) = match size {
        PageSize::All => (docs, 1, 1),
        PageSize::Rows(rows) => {
            let total_pages = total.div_ceil(rows).max(1);
            let page = page.clamp(1, total_pages);
            let documents = docs.into_iter().skip((page - 1) * rows).take(rows).collect();
            (documents, page, total_pages)
        }
    };

    DocumentPage {
        documents,
        total,
        page,
        total_pages,
        limit: size.as_limit(),
    }
}

/// Service behind the document table.
pub struct DocumentService {
    ctx: DbContext,
    blobs: Arc<dyn BlobStore>,
}

impl DocumentService {
    pub fn new(ctx: DbContext, blobs: Arc<dyn BlobStore>) -> Self {
        Self { ctx, blobs }
    }

    /// Documents matching `filter`, newest first.
    pub async fn filtered(&self, filter: &DocumentFilter) -> Result<Vec<DocumentRecord>> {
        let docs = self.ctx.documents().list().await?;
        Ok(docs.into_iter().filter(|d| filter.matches(d)).collect())
    }

    pub async fn list(&self, filter: &DocumentFilter, page: usize, size: PageSize) -> Result<DocumentPage> {
        Ok(paginate(self.filtered(filter).await?, page, size))
    }

    pub async fn get(&self, id: &str) -> Result<DocumentRecord> {
        self.ctx
            .documents()
            .get(id)
            .await?
            .ok_or_else(|| HarvestError::NotFound(id.to_string()))
    }

    /// Public URL of the document's blob.
    pub async fn preview_url(&self, id: &str) -> Result<String> {
        let doc = self.get(id).await?;
        let key = doc
            .storage_key
            .ok_or_else(|| HarvestError::NotFound(format!("{} has no stored file", id)))?;
        Ok(self.blobs.public_url(&key)?)
    }

    /// The "parse" action: flag the document as processing.
    pub async fn mark_processing(&self, id: &str) -> Result<DocumentRecord> {
        if !self
            .ctx
            .documents()
            .update_status(id, DocumentStatus::Processing)
            .await?
        {
            return Err(HarvestError::NotFound(id.to_string()));
        }
        info!("Document {} marked processing", id);
        self.get(id).await
    }

    /// Remove the blob, then the row. A failed blob removal keeps the row.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let doc = self.get(id).await?;
        if let Some(key) = doc.storage_key {
            self.blobs.remove(&[key]).await?;
        }
        if !self.ctx.documents().delete(id).await? {
            return Err(HarvestError::NotFound(id.to_string()));
        }
        info!("Deleted document {} ({})", id, doc.name);
        Ok(())
    }

    /// Delete every document matching `filter`, counting failures.
    pub async fn bulk_delete(&self, filter: &DocumentFilter) -> Result<BulkDeleteOutcome> {
        let mut outcome = BulkDeleteOutcome::default();
        for doc in self.filtered(filter).await? {
            match self.delete(&doc.id).await {
                Ok(()) => outcome.deleted += 1,
                Err(e) => {
                    warn!("Failed to delete {}: {}", doc.id, e);
                    outcome.failed += 1;
                }
            }
        }
        Ok(outcome)
    }
}
