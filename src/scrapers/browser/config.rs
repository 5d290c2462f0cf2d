//! Browser engine configuration types.

use serde::{Deserialize, Serialize};

/// `[browser]` section: how headless Chromium is launched or reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    pub headless: bool,

    /// Proxy server URL (e.g., "http://127.0.0.1:3128").
    pub proxy: Option<String>,

    /// Upper bound in seconds for each wait on the rendered page.
    pub timeout: u64,

    /// Additional Chrome arguments.
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    pub remote_url: Option<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: true,
            proxy: None,
            timeout: 30,
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}
