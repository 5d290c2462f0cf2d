//! Headless Chromium rendering for pages whose issue list only appears
//! after script runs.

mod config;

pub use config::BrowserEngineConfig;

#[cfg(feature = "browser")]
pub use renderer::BrowserRenderer;

/// Attribute stamped on PDF links already on the page before an issue is
/// selected.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const STALE_MARKER: &str = "data-gazette-stale";

/// PDF links that showed up after the issue was selected.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn fresh_pdf_link_selector() -> String {
    format!(r#"a[href$=".pdf" i]:not([{}])"#, STALE_MARKER)
}

/// Script that marks the current PDF links stale, then selects `token` in
/// the widget and fires its change handler. Evaluates to `false` when the
/// widget is missing.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn select_issue_script(widget_id: &str, token: &str) -> String {
    format!(
        "(() => {{ const el = document.getElementById({id}); \
         if (!el) return false; \
         document.querySelectorAll('a[href]').forEach(a => a.setAttribute({marker}, '')); \
         el.value = {token}; \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
        id = serde_json::to_string(widget_id).unwrap_or_default(),
        marker = serde_json::to_string(STALE_MARKER).unwrap_or_default(),
        token = serde_json::to_string(token).unwrap_or_default(),
    )
}

#[cfg(feature = "browser")]
mod renderer {
    use std::sync::Arc;
    use std::time::Duration;

    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use tokio::sync::Mutex;
    use tracing::{debug, info};

    use super::BrowserEngineConfig;
    use crate::error::{HarvestError, Result};

    /// Delay between selector probes.
    const POLL_INTERVAL: Duration = Duration::from_millis(250);

    /// Lazily launched browser shared by every render.
    #[derive(Clone)]
    pub struct BrowserRenderer {
        config: BrowserEngineConfig,
        browser: Arc<Mutex<Option<Browser>>>,
    }

    fn browser_error(url: &str, e: impl std::fmt::Display) -> HarvestError {
        HarvestError::fetch(url, format!("browser: {}", e))
    }

    impl BrowserRenderer {
        /// Common Chrome executable paths to check.
        const CHROME_PATHS: &'static [&'static str] = &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ];

        pub fn new(config: BrowserEngineConfig) -> Self {
            Self {
                config,
                browser: Arc::new(Mutex::new(None)),
            }
        }

        fn find_chrome() -> Option<std::path::PathBuf> {
            for path in Self::CHROME_PATHS {
                let p = std::path::Path::new(path);
                if p.exists() {
                    info!("Found Chrome at: {}", path);
                    return Some(p.to_path_buf());
                }
            }

            for cmd in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
                if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                    if output.status.success() {
                        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                        if !path.is_empty() {
                            info!("Found Chrome in PATH: {}", path);
                            return Some(std::path::PathBuf::from(path));
                        }
                    }
                }
            }
            None
        }

        /// Launch or connect to a browser.
        async fn start(&self, url: &str) -> Result<Browser> {
            let (browser, mut handler) = match self.config.remote_url {
                Some(ref remote) => {
                    info!("Connecting to remote browser at {}", remote);
                    let http_url = remote.replace("ws://", "http://").replace("wss://", "https://");
                    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));
                    let info: serde_json::Value = reqwest::get(&version_url)
                        .await
                        .map_err(|e| browser_error(&version_url, e))?
                        .json()
                        .await
                        .map_err(|e| browser_error(&version_url, e))?;
                    let ws_url = info
                        .get("webSocketDebuggerUrl")
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| browser_error(&version_url, "no webSocketDebuggerUrl"))?;
                    Browser::connect(ws_url)
                        .await
                        .map_err(|e| browser_error(ws_url, e))?
                }
                None => {
                    info!("Launching browser (headless={})", self.config.headless);
                    let chrome = Self::find_chrome()
                        .ok_or_else(|| browser_error(url, "Chrome/Chromium not found"))?;
                    let mut builder = BrowserConfig::builder().chrome_executable(chrome);
                    if !self.config.headless {
                        builder = builder.with_head();
                    }
                    if let Some(ref proxy) = self.config.proxy {
                        builder = builder.arg(format!("--proxy-server={}", proxy));
                    }
                    builder = builder
                        .arg("--disable-dev-shm-usage")
                        .arg("--no-first-run")
                        .arg("--no-sandbox")
                        .arg("--disable-gpu");
                    for arg in &self.config.chrome_args {
                        builder = builder.arg(arg);
                    }
                    let config = builder.build().map_err(|e| browser_error(url, e))?;
                    Browser::launch(config)
                        .await
                        .map_err(|e| browser_error(url, e))?
                }
            };

            tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(browser)
        }

        async fn open(&self, url: &str) -> Result<Page> {
            let mut guard = self.browser.lock().await;
            if guard.is_none() {
                *guard = Some(self.start(url).await?);
            }
            let browser = guard
                .as_ref()
                .ok_or_else(|| browser_error(url, "browser not initialized"))?;
            browser.new_page(url).await.map_err(|e| browser_error(url, e))
        }

        /// Poll until `selector` matches, bounded by the configured timeout.
        async fn wait_for(&self, page: &Page, selector: &str) -> Result<()> {
            debug!("Waiting for selector: {}", selector);
            let probe = async {
                while page.find_element(selector).await.is_err() {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            };
            tokio::time::timeout(Duration::from_secs(self.config.timeout), probe)
                .await
                .map_err(|_| HarvestError::Timeout {
                    what: selector.to_string(),
                    secs: self.config.timeout,
                })
        }

        /// Render `url` and return its markup once `selector` is present.
        pub async fn render(&self, url: &str, selector: &str) -> Result<String> {
            let page = self.open(url).await?;
            let result = async {
                self.wait_for(&page, selector).await?;
                page.content().await.map_err(|e| browser_error(url, e))
            }
            .await;
            let _ = page.close().await;
            result
        }

        /// Select `token` in the widget and return the markup of the page
        /// that lists the issue's PDFs.
        pub async fn render_issue(&self, url: &str, widget_id: &str, token: &str) -> Result<String> {
            let page = self.open(url).await?;
            let result = async {
                self.wait_for(&page, &format!("#{}", widget_id)).await?;

                let script = super::select_issue_script(widget_id, token);
                let selected = page
                    .evaluate(script)
                    .await
                    .map_err(|e| browser_error(url, e))?
                    .into_value::<bool>()
                    .unwrap_or(false);
                if !selected {
                    return Err(HarvestError::Parse(format!(
                        "Widget '{}' not found on rendered page",
                        widget_id
                    )));
                }

                // Links present before the selection carry the stale marker,
                // so only the selected issue's documents satisfy the wait. A
                // postback reloads the page and drops every marker.
                self.wait_for(&page, &super::fresh_pdf_link_selector()).await?;
                debug!("Issue {} rendered", token);
                page.content().await.map_err(|e| browser_error(url, e))
            }
            .await;
            let _ = page.close().await;
            result
        }
    }
}
