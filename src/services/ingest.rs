//! Issue ingestion: discover an issue's PDFs, store each blob and record it.
//!
//! Every document is handled on its own. A download, upload or insert
//! failure is logged and reported in the summary without touching the
//! other documents of the batch.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{HarvestError, Result};
use crate::models::DocumentRecord;
use crate::repository::DbContext;
use crate::scrapers::{extract_pdf_links, resolve_url, HttpClient, IssueListing, PdfLink};
use crate::storage::{derive_storage_name, pdf_storage_path, BlobStore, UploadOptions};

/// A document that made it into storage and the table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestedPdf {
    pub id: String,
    pub name: String,
    pub storage_key: String,
}

/// A document skipped during ingestion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedPdf {
    pub name: String,
    pub url: String,
    pub error: String,
}

/// Outcome of one ingestion run, documents in page order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub discovered: usize,
    pub processed: usize,
    pub pdfs: Vec<IngestedPdf>,
    pub failed: Vec<FailedPdf>,
}

/// Service that crawls one issue into blob storage and the documents table.
pub struct IngestService {
    ctx: DbContext,
    blobs: Arc<dyn BlobStore>,
    client: HttpClient,
    listing: Box<dyn IssueListing>,
    base_url: String,
    concurrency: usize,
}

impl IngestService {
    pub fn new(
        ctx: DbContext,
        blobs: Arc<dyn BlobStore>,
        client: HttpClient,
        listing: Box<dyn IssueListing>,
        base_url: &str,
    ) -> Self {
        Self {
            ctx,
            blobs,
            client,
            listing,
            base_url: base_url.to_string(),
            concurrency: 4,
        }
    }

    /// Cap on documents processed at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Ingest every PDF listed for `token`.
    pub async fn ingest(&self, token: &str) -> Result<IngestSummary> {
        let token = token.trim();
        if token.is_empty() {
            return Err(HarvestError::Validation("token is required".to_string()));
        }

        info!("Ingesting issue {}", token);
        let html = self.listing.fetch_listing(token).await?;
        let links = extract_pdf_links(&html);
        if links.is_empty() {
            return Err(HarvestError::NoDocuments(token.to_string()));
        }
        info!("Found {} PDF links for issue {}", links.len(), token);

        let tasks: Vec<_> = links
            .iter()
            .cloned()
            .map(|link| async move { self.ingest_one(token, &link).await })
            .collect();
        let outcomes: Vec<_> = stream::iter(tasks)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut summary = IngestSummary {
            discovered: links.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(pdf) => summary.pdfs.push(pdf),
                Err(failed) => summary.failed.push(failed),
            }
        }
        summary.processed = summary.pdfs.len();

        info!(
            "Issue {}: {} of {} documents ingested",
            token, summary.processed, summary.discovered
        );
        Ok(summary)
    }

    async fn ingest_one(&self, token: &str, link: &PdfLink) -> std::result::Result<IngestedPdf, FailedPdf> {
        let url = match resolve_url(&link.href, &self.base_url) {
            Ok(url) => url,
            Err(e) => return Err(skipped(link, &link.href, e)),
        };
        self.store_document(token, link, &url)
            .await
            .map_err(|e| skipped(link, &url, e))
    }

    async fn store_document(&self, token: &str, link: &PdfLink, url: &str) -> Result<IngestedPdf> {
        let bytes = self.client.get_bytes(url).await?;

        let path = pdf_storage_path(&derive_storage_name(&link.text, Utc::now()));
        self.blobs.upload(&path, &bytes, UploadOptions::pdf()).await?;

        let record = DocumentRecord::new_pending(
            link.text.clone(),
            path.clone(),
            url.to_string(),
            token.to_string(),
        );
        if let Err(e) = self.ctx.documents().insert(&record).await {
            if let Err(cleanup) = self.blobs.remove(std::slice::from_ref(&path)).await {
                warn!("Could not remove orphaned blob {}: {}", path, cleanup);
            }
            return Err(e.into());
        }

        debug!("Stored {} as {}", url, path);
        Ok(IngestedPdf {
            id: record.id,
            name: record.name,
            storage_key: path,
        })
    }
}

fn skipped(link: &PdfLink, url: &str, error: HarvestError) -> FailedPdf {
    warn!("Skipping '{}' ({}): {}", link.text, url, error);
    FailedPdf {
        name: link.text.clone(),
        url: url.to_string(),
        error: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::path::Path;
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::storage::LocalBlobStore;

    struct FixedListing(String);

    #[async_trait]
    impl IssueListing for FixedListing {
        async fn fetch_listing(&self, _token: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn service(root: &Path, html: &str) -> IngestService {
        let ctx = DbContext::from_path(&root.join("test.db"));
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(
            root.join("storage"),
            "pdf-storage",
            "http://localhost:3030",
        ));
        let client = HttpClient::new(Duration::from_secs(2), None).unwrap();
        // Port 9 refuses connections, so every download fails fast.
        IngestService::new(
            ctx,
            blobs,
            client,
            Box::new(FixedListing(html.to_string())),
            "http://127.0.0.1:9",
        )
    }

    fn assert_send<F: Future + Send>(_future: F) {}

    #[test]
    fn test_ingest_can_run_on_a_spawned_task() {
        let dir = tempdir().unwrap();
        let service = service(dir.path(), "");
        assert_send(async move { service.ingest("12-2024").await });
    }

    #[tokio::test]
    async fn test_blank_token_rejected() {
        let dir = tempdir().unwrap();
        let err = service(dir.path(), "").ingest("   ").await.unwrap_err();
        assert!(matches!(err, HarvestError::Validation(_)));
    }

    #[tokio::test]
    async fn test_listing_without_pdfs() {
        let dir = tempdir().unwrap();
        let html = r#"<a href="/about.html">About</a>"#;
        let err = service(dir.path(), html).ingest("12-2024").await.unwrap_err();
        assert!(matches!(err, HarvestError::NoDocuments(_)));
    }

    #[tokio::test]
    async fn test_failed_downloads_reported_in_page_order() {
        let dir = tempdir().unwrap();
        let html = r#"
            <a href="/pdfs/a.pdf">Part A</a>
            <a href="/pdfs/b.pdf">Part B</a>
            <a href="/pdfs/c.pdf">Part C</a>"#;
        let summary = service(dir.path(), html)
            .with_concurrency(3)
            .ingest("12-2024")
            .await
            .unwrap();

        assert_eq!(summary.discovered, 3);
        assert_eq!(summary.processed, 0);
        let names: Vec<_> = summary.failed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Part A", "Part B", "Part C"]);
        assert_eq!(summary.failed[0].url, "http://127.0.0.1:9/pdfs/a.pdf");
    }
}
