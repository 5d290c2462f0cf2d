//! Source-catalog refresh.
//!
//! Reads the issue dropdown from the source page and replaces the stored
//! catalog with what it finds. Failures before the write leave the previous
//! catalog untouched; the write itself is a single transaction.

use chrono::Utc;
use tracing::info;
use url::Url;

use crate::error::{HarvestError, Result};
use crate::models::CatalogEntry;
use crate::repository::DbContext;
use crate::scrapers::CatalogSource;

/// Service for keeping the issue catalog in sync with the source site.
pub struct CatalogService {
    ctx: DbContext,
    source: Box<dyn CatalogSource>,
    source_url: String,
}

impl CatalogService {
    pub fn new(ctx: DbContext, source: Box<dyn CatalogSource>, source_url: &str) -> Self {
        Self {
            ctx,
            source,
            source_url: source_url.to_string(),
        }
    }

    /// URL the catalog is read from, with the optional `date` hint applied.
    pub fn catalog_url(&self, date_hint: Option<&str>) -> Result<String> {
        let hint = date_hint.map(str::trim).filter(|h| !h.is_empty());
        let Some(hint) = hint else {
            return Ok(self.source_url.clone());
        };
        let mut url = Url::parse(&self.source_url).map_err(|e| {
            HarvestError::Validation(format!("Invalid source URL '{}': {}", self.source_url, e))
        })?;
        url.query_pairs_mut().append_pair("date", hint);
        Ok(url.to_string())
    }

    /// Scrape the catalog and replace the stored one. Returns the number of
    /// entries written.
    pub async fn refresh(&self, date_hint: Option<&str>) -> Result<usize> {
        let url = self.catalog_url(date_hint)?;
        info!("Refreshing catalog from {}", url);

        let options = self.source.fetch_catalog_options(&url).await?;
        let entries = CatalogEntry::from_options(options, Utc::now());
        if entries.is_empty() {
            return Err(HarvestError::EmptyResult(url));
        }

        let written = self.ctx.catalog().replace_all(&entries).await?;
        info!("Catalog refreshed: {} issues", written);
        Ok(written)
    }

    /// Stored catalog in page order.
    pub async fn list(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.ctx.catalog().list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogOption;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    /// Serves whatever page the test sets, recording requested URLs.
    #[derive(Clone, Default)]
    struct FakeSource {
        page: Arc<Mutex<Option<Vec<CatalogOption>>>>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl FakeSource {
        fn serve(&self, options: Option<Vec<CatalogOption>>) {
            *self.page.lock().unwrap() = options;
        }
    }

    #[async_trait]
    impl CatalogSource for FakeSource {
        async fn fetch_catalog_options(&self, source_url: &str) -> Result<Vec<CatalogOption>> {
            self.requested.lock().unwrap().push(source_url.to_string());
            self.page
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| HarvestError::fetch(source_url, "HTTP 503 Service Unavailable"))
        }
    }

    async fn setup() -> (CatalogService, FakeSource, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        let source = FakeSource::default();
        let service = CatalogService::new(
            ctx,
            Box::new(source.clone()),
            "http://gazette.test/jurnal-sgl.aspx",
        );
        (service, source, dir)
    }

    fn tokens(entries: &[CatalogEntry]) -> Vec<(String, i32)> {
        entries.iter().map(|e| (e.token.clone(), e.sort_order)).collect()
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let (service, source, _dir) = setup().await;
        source.serve(Some(vec![
            CatalogOption::new("ديسمبر - 2024", "12-2024"),
            CatalogOption::new("نوفمبر 2024", "11-2024"),
        ]));

        assert_eq!(service.refresh(None).await.unwrap(), 2);
        let first = service.list().await.unwrap();
        assert_eq!(service.refresh(None).await.unwrap(), 2);
        let second = service.list().await.unwrap();

        assert_eq!(tokens(&first), tokens(&second));
        assert_eq!(
            tokens(&second),
            vec![("12-2024".to_string(), 0), ("11-2024".to_string(), 1)]
        );
        assert_eq!(second[0].label, "ديسمبر - 2024");
    }

    #[tokio::test]
    async fn test_refresh_replaces_catalog() {
        let (service, source, _dir) = setup().await;
        source.serve(Some(vec![
            CatalogOption::new("A", "a"),
            CatalogOption::new("B", "b"),
        ]));
        service.refresh(None).await.unwrap();

        source.serve(Some(vec![CatalogOption::new("C", "c")]));
        assert_eq!(service.refresh(None).await.unwrap(), 1);

        assert_eq!(tokens(&service.list().await.unwrap()), vec![("c".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_catalog() {
        let (service, source, _dir) = setup().await;
        source.serve(Some(vec![CatalogOption::new("A", "a")]));
        service.refresh(None).await.unwrap();

        source.serve(None);
        let err = service.refresh(None).await.unwrap_err();
        assert!(matches!(err, HarvestError::Fetch { .. }));

        assert_eq!(tokens(&service.list().await.unwrap()), vec![("a".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_date_hint_becomes_query_param() {
        let (service, source, _dir) = setup().await;
        source.serve(Some(vec![CatalogOption::new("A", "a")]));

        service.refresh(Some("2024-12")).await.unwrap();
        service.refresh(Some("  ")).await.unwrap();

        let requested = source.requested.lock().unwrap().clone();
        assert_eq!(
            requested,
            vec![
                "http://gazette.test/jurnal-sgl.aspx?date=2024-12".to_string(),
                "http://gazette.test/jurnal-sgl.aspx".to_string(),
            ]
        );
    }
}
