//! Service layer shared by the CLI and the HTTP server.

pub mod catalog;
pub mod documents;
pub mod ingest;

pub use catalog::CatalogService;
pub use documents::{BulkDeleteOutcome, DocumentFilter, DocumentPage, DocumentService, PageSize};
pub use ingest::{FailedPdf, IngestService, IngestSummary, IngestedPdf};

use std::sync::Arc;

use crate::config::Settings;
use crate::error::Result;
use crate::repository::DbContext;
use crate::scrapers::{catalog_source_from_settings, listing_from_settings, HttpClient};
use crate::storage::BlobStore;

/// Catalog service wired from settings.
pub fn catalog_service(settings: &Settings, ctx: DbContext, client: &HttpClient) -> Result<CatalogService> {
    let source = catalog_source_from_settings(settings, client)?;
    Ok(CatalogService::new(ctx, source, &settings.source.url))
}

/// Ingest service wired from settings.
pub fn ingest_service(
    settings: &Settings,
    ctx: DbContext,
    blobs: Arc<dyn BlobStore>,
    client: &HttpClient,
) -> Result<IngestService> {
    let listing = listing_from_settings(settings, client)?;
    Ok(IngestService::new(
        ctx,
        blobs,
        client.clone(),
        listing,
        &settings.source.base_url(),
    )
    .with_concurrency(settings.ingest.concurrency))
}
