//! HTTP response wrapper.

use reqwest::Response;

use crate::error::{HarvestError, Result};

/// A successful response, still holding its unread body.
pub struct HttpResponse {
    pub url: String,
    response: Response,
}

impl HttpResponse {
    /// Wrap a response, rejecting anything outside 2xx.
    pub(super) fn checked(url: &str, response: Response) -> Result<Self> {
        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::fetch(url, format!("HTTP {}", status)));
        }
        Ok(Self {
            url: url.to_string(),
            response,
        })
    }

    /// Get response body as bytes.
    pub async fn bytes(self) -> Result<Vec<u8>> {
        let url = self.url;
        self.response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| HarvestError::fetch(&url, e))
    }

    /// Get response body as text.
    pub async fn text(self) -> Result<String> {
        let url = self.url;
        self.response
            .text()
            .await
            .map_err(|e| HarvestError::fetch(&url, e))
    }
}
