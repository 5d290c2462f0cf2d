//! Issue catalog extraction from the source page's dropdown.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::HttpClient;
use crate::error::{HarvestError, Result};
use crate::models::CatalogOption;

/// Where the catalog's raw options come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch `source_url` and return the widget's options in page order.
    async fn fetch_catalog_options(&self, source_url: &str) -> Result<Vec<CatalogOption>>;
}

/// CSS selector matching an element by id, safe for ids with odd characters.
pub(crate) fn id_selector(widget_id: &str) -> Result<Selector> {
    let css = format!(r#"[id="{}"]"#, widget_id.replace('\\', "\\\\").replace('"', "\\\""));
    Selector::parse(&css)
        .map_err(|e| HarvestError::Parse(format!("Invalid widget id '{}': {:?}", widget_id, e)))
}

/// Find the widget element on a parsed page.
pub(crate) fn find_widget<'a>(document: &'a Html, widget_id: &str) -> Result<ElementRef<'a>> {
    let selector = id_selector(widget_id)?;
    document.select(&selector).next().ok_or_else(|| {
        HarvestError::Parse(format!("Selection widget '#{}' not found on page", widget_id))
    })
}

/// Extract `(label, token)` pairs from the widget's `<option>` elements.
///
/// Options with a blank value are placeholders and are skipped. Fails with
/// `Parse` when the widget is missing and `EmptyResult` when no usable
/// option remains.
pub fn parse_catalog_options(html: &str, widget_id: &str) -> Result<Vec<CatalogOption>> {
    let document = Html::parse_document(html);
    let widget = find_widget(&document, widget_id)?;
    let option_selector = Selector::parse("option")
        .map_err(|e| HarvestError::Parse(format!("Invalid option selector: {:?}", e)))?;

    let options: Vec<CatalogOption> = widget
        .select(&option_selector)
        .filter_map(|opt| {
            let label = opt.text().collect::<String>().trim().to_string();
            // An option without a value attribute submits its text.
            let token = opt.value().attr("value").unwrap_or(label.as_str()).trim().to_string();
            (!token.is_empty()).then(|| CatalogOption::new(label, token))
        })
        .collect();

    if options.is_empty() {
        return Err(HarvestError::EmptyResult(widget_id.to_string()));
    }
    Ok(options)
}

/// Plain HTTP GET plus DOM parse.
pub struct StaticCatalogSource {
    client: HttpClient,
    widget_id: String,
}

impl StaticCatalogSource {
    pub fn new(client: HttpClient, widget_id: &str) -> Self {
        Self {
            client,
            widget_id: widget_id.to_string(),
        }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch_catalog_options(&self, source_url: &str) -> Result<Vec<CatalogOption>> {
        let html = self.client.get_text(source_url).await?;
        parse_catalog_options(&html, &self.widget_id)
    }
}

/// Renders the page in headless Chromium before parsing.
#[cfg(feature = "browser")]
pub struct BrowserCatalogSource {
    renderer: super::browser::BrowserRenderer,
    widget_id: String,
}

#[cfg(feature = "browser")]
impl BrowserCatalogSource {
    pub fn new(renderer: super::browser::BrowserRenderer, widget_id: &str) -> Self {
        Self {
            renderer,
            widget_id: widget_id.to_string(),
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl CatalogSource for BrowserCatalogSource {
    async fn fetch_catalog_options(&self, source_url: &str) -> Result<Vec<CatalogOption>> {
        let selector = format!("#{}", self.widget_id);
        let html = self.renderer.render(source_url, &selector).await?;
        parse_catalog_options(&html, &self.widget_id)
    }
}
