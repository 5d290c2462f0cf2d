//! HTTP client for the source site.
//!
//! Cookies persist across requests so a form postback carries the session
//! the listing page handed out.

mod response;
mod user_agent;

pub use response::HttpResponse;
pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::Duration;

use reqwest::header::REFERER;
use reqwest::Client;
use tracing::debug;

use crate::error::{HarvestError, Result};

/// HTTP client that turns network failures and non-2xx answers into
/// [`HarvestError::Fetch`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    /// - None: default gazette-harvest user agent
    /// - Some("impersonate"): real browser user agent
    /// - Some(custom): custom user agent string
    pub fn new(timeout: Duration, user_agent_config: Option<&str>) -> reqwest::Result<Self> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request. Non-2xx statuses are errors.
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HarvestError::fetch(url, e))?;

        HttpResponse::checked(url, response)
    }

    /// Get page content as text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.get(url).await?.text().await
    }

    /// Get the response body as bytes.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.get(url).await?.bytes().await
    }

    /// POST url-encoded form fields back to the page and return the answer.
    pub async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<String> {
        debug!("POST {} ({} fields)", url, fields.len());
        let response = self
            .client
            .post(url)
            .header(REFERER, url)
            .form(fields)
            .send()
            .await
            .map_err(|e| HarvestError::fetch(url, e))?;

        HttpResponse::checked(url, response)?.text().await
    }
}
