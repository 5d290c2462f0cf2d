//! Scraping of the gazette source site.

pub mod browser;
pub mod catalog;
mod http_client;
pub mod links;
pub mod listing;

pub use catalog::{parse_catalog_options, CatalogSource, StaticCatalogSource};
pub use http_client::{HttpClient, HttpResponse};
pub use links::{extract_pdf_links, resolve_url, PdfLink};
pub use listing::{FormPostbackListing, IssueListing, UrlTemplateListing};

use crate::config::{CatalogStrategy, ListingStrategy, Settings};
use crate::error::{HarvestError, Result};

#[cfg(not(feature = "browser"))]
fn browser_unavailable() -> HarvestError {
    HarvestError::Validation(
        "Browser support not compiled. Rebuild with: cargo build --features browser".to_string(),
    )
}

/// Catalog source selected by `source.catalog_strategy`.
pub fn catalog_source_from_settings(
    settings: &Settings,
    client: &HttpClient,
) -> Result<Box<dyn CatalogSource>> {
    match settings.source.catalog_strategy {
        CatalogStrategy::Static => Ok(Box::new(StaticCatalogSource::new(
            client.clone(),
            &settings.source.widget_id,
        ))),
        #[cfg(feature = "browser")]
        CatalogStrategy::Browser => Ok(Box::new(catalog::BrowserCatalogSource::new(
            browser::BrowserRenderer::new(settings.browser.clone()),
            &settings.source.widget_id,
        ))),
        #[cfg(not(feature = "browser"))]
        CatalogStrategy::Browser => Err(browser_unavailable()),
    }
}

/// Issue listing selected by `source.listing_strategy`.
pub fn listing_from_settings(
    settings: &Settings,
    client: &HttpClient,
) -> Result<Box<dyn IssueListing>> {
    let source = &settings.source;
    match source.listing_strategy {
        ListingStrategy::FormPostback => Ok(Box::new(FormPostbackListing::new(
            client.clone(),
            &source.url,
            &source.widget_id,
        ))),
        ListingStrategy::UrlTemplate => {
            let template = source.url_template.as_deref().ok_or_else(|| {
                HarvestError::Validation(
                    "source.url_template must be set for the url_template listing strategy"
                        .to_string(),
                )
            })?;
            Ok(Box::new(UrlTemplateListing::new(client.clone(), template)))
        }
        #[cfg(feature = "browser")]
        ListingStrategy::Browser => Ok(Box::new(listing::BrowserListing::new(
            browser::BrowserRenderer::new(settings.browser.clone()),
            &source.url,
            &source.widget_id,
        ))),
        #[cfg(not(feature = "browser"))]
        ListingStrategy::Browser => Err(browser_unavailable()),
    }
}
