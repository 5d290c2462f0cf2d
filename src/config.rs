//! Configuration management for gazette-harvest.
//!
//! Settings are layered: built-in defaults, then an optional TOML file
//! (`--config`, else `gazette.toml` in the working directory), then
//! environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::repository::DbContext;
use crate::scrapers::browser::BrowserEngineConfig;
use crate::scrapers::links::origin_of;
use crate::scrapers::HttpClient;
use crate::storage::LocalBlobStore;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "gazette.db";

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILENAME: &str = "gazette.toml";

/// Listing page of the official gazette.
pub const DEFAULT_SOURCE_URL: &str = "http://www.itda.gov.eg/jurnal-sgl.aspx";

/// Id of the issue dropdown on the listing page.
pub const DEFAULT_WIDGET_ID: &str = "DropDownList1";

/// Storage subdirectory name.
const STORAGE_SUBDIR: &str = "storage";

/// How the issue catalog is read from the source page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStrategy {
    /// Plain GET and DOM parse.
    #[default]
    Static,
    /// Render in headless Chromium first.
    Browser,
}

/// How the listing page for one issue is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStrategy {
    /// Re-post the page's form with the dropdown set to the token.
    #[default]
    FormPostback,
    /// GET a URL built from `source.url_template`.
    UrlTemplate,
    /// Drive the dropdown in headless Chromium.
    Browser,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Listing page that carries the issue dropdown.
    pub url: String,
    /// Origin relative PDF links are joined onto. Derived from `url` when unset.
    pub base_url: Option<String>,
    pub widget_id: String,
    pub catalog_strategy: CatalogStrategy,
    pub listing_strategy: ListingStrategy,
    /// Issue listing URL with a `{token}` placeholder.
    pub url_template: Option<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            base_url: None,
            widget_id: DEFAULT_WIDGET_ID.to_string(),
            catalog_strategy: CatalogStrategy::default(),
            listing_strategy: ListingStrategy::default(),
            url_template: None,
        }
    }
}

impl SourceSettings {
    /// Base that relative links resolve against.
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .or_else(|| origin_of(&self.url))
            .unwrap_or_else(|| self.url.clone())
    }
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// None for the default agent, "impersonate" for a browser agent, or a custom string.
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: 30,
        }
    }
}

/// `[ingest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Documents downloaded in parallel per issue.
    pub concurrency: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database URL (overrides data_dir/gazette.db if set).
    pub database_url: Option<String>,
    /// Root of the blob store.
    pub storage_dir: PathBuf,
    /// Bucket the PDFs are stored in.
    pub bucket: String,
    /// Prefix of public blob URLs.
    pub public_base_url: String,
    pub source: SourceSettings,
    pub http: HttpSettings,
    pub ingest: IngestSettings,
    pub browser: BrowserEngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gazette");

        Self::with_data_dir(data_dir)
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            storage_dir: data_dir.join(STORAGE_SUBDIR),
            data_dir,
            database_url: None,
            bucket: "pdf-storage".to_string(),
            public_base_url: "http://localhost:3030".to_string(),
            source: SourceSettings::default(),
            http: HttpSettings::default(),
            ingest: IngestSettings::default(),
            browser: BrowserEngineConfig::default(),
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => format!("sqlite:{}", self.database_path().display()),
        }
    }

    /// Full path to the default SQLite database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_DATABASE_FILENAME)
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for (label, dir) in [("data", &self.data_dir), ("storage", &self.storage_dir)] {
            tracing::debug!("Ensuring {} directory {}", label, dir.display());
            std::fs::create_dir_all(dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("Failed to create {} directory '{}': {}", label, dir.display(), e),
                )
            })?;
        }
        Ok(())
    }

    /// Create a database context from the configured URL or path.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }

    /// Create the blob store backing ingested PDFs.
    pub fn create_blob_store(&self) -> LocalBlobStore {
        LocalBlobStore::new(self.storage_dir.clone(), &self.bucket, &self.public_base_url)
    }

    /// Create the HTTP client used against the source site.
    pub fn create_http_client(&self) -> anyhow::Result<HttpClient> {
        HttpClient::new(
            Duration::from_secs(self.http.timeout_secs),
            self.http.user_agent.as_deref(),
        )
        .context("Failed to create HTTP client")
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Resolve relative paths against the working directory instead of the
    /// config file's directory.
    pub use_cwd: bool,
}

/// On-disk config file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    database_url: Option<String>,
    storage_dir: Option<PathBuf>,
    bucket: Option<String>,
    public_base_url: Option<String>,
    source: SourceSettings,
    http: HttpSettings,
    ingest: IngestSettings,
    browser: BrowserEngineConfig,
}

impl ConfigFile {
    fn parse(contents: &str, path: &Path) -> anyhow::Result<Self> {
        toml::from_str(contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Fold the file into settings. Relative paths resolve against `base_dir`.
    fn apply_to_settings(self, settings: &mut Settings, base_dir: &Path) {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base_dir.join(p) };

        if let Some(data_dir) = self.data_dir {
            *settings = Settings::with_data_dir(resolve(data_dir));
        }
        if let Some(storage_dir) = self.storage_dir {
            settings.storage_dir = resolve(storage_dir);
        }
        if self.database_url.is_some() {
            settings.database_url = self.database_url;
        }
        if let Some(bucket) = self.bucket {
            settings.bucket = bucket;
        }
        if let Some(base) = self.public_base_url {
            settings.public_base_url = base;
        }
        settings.source = self.source;
        settings.http = self.http;
        settings.ingest = self.ingest;
        settings.browser = self.browser;
    }
}

/// Apply environment overrides through `lookup` (normally `std::env::var`).
fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(dir) = var("GAZETTE_DATA_DIR") {
        tracing::debug!("Using GAZETTE_DATA_DIR from environment: {}", dir);
        let dir = PathBuf::from(dir);
        if settings.storage_dir == settings.data_dir.join(STORAGE_SUBDIR) {
            settings.storage_dir = dir.join(STORAGE_SUBDIR);
        }
        settings.data_dir = dir;
    }
    if let Some(url) = var("DATABASE_URL") {
        tracing::debug!("Using DATABASE_URL from environment: {}", url);
        settings.database_url = Some(url);
    }
    if let Some(url) = var("GAZETTE_SOURCE_URL") {
        settings.source.url = url;
    }
    if let Some(url) = var("GAZETTE_PUBLIC_BASE_URL") {
        settings.public_base_url = url;
    }
}

/// Load settings with explicit options.
pub async fn load_settings(options: LoadOptions) -> anyhow::Result<Settings> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut settings = Settings::default();

    let config_path = match options.config_path {
        Some(path) => Some(path),
        None => Some(cwd.join(DEFAULT_CONFIG_FILENAME)).filter(|p| p.exists()),
    };

    if let Some(path) = config_path {
        tracing::debug!("Loading config from {}", path.display());
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let file = ConfigFile::parse(&contents, &path)?;

        let base_dir = if options.use_cwd {
            cwd.clone()
        } else {
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.clone())
        };
        file.apply_to_settings(&mut settings, &base_dir);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::with_data_dir(PathBuf::from("/data"));
        assert_eq!(settings.database_url(), "sqlite:/data/gazette.db");
        assert_eq!(settings.storage_dir, PathBuf::from("/data/storage"));
        assert_eq!(settings.source.widget_id, "DropDownList1");
        assert_eq!(settings.source.listing_strategy, ListingStrategy::FormPostback);
        assert_eq!(settings.source.base_url(), "http://www.itda.gov.eg");
        assert_eq!(settings.ingest.concurrency, 4);
    }

    #[test]
    fn test_config_file_sections() {
        let toml = r#"
            data_dir = "var"
            bucket = "gazettes"

            [source]
            url = "http://gazette.test/list.aspx"
            listing_strategy = "url_template"
            url_template = "http://gazette.test/issue/{token}"

            [http]
            timeout_secs = 5

            [ingest]
            concurrency = 2

            [browser]
            headless = false
        "#;
        let file = ConfigFile::parse(toml, Path::new("gazette.toml")).unwrap();
        let mut settings = Settings::default();
        file.apply_to_settings(&mut settings, Path::new("/etc/gazette"));

        assert_eq!(settings.data_dir, PathBuf::from("/etc/gazette/var"));
        assert_eq!(settings.storage_dir, PathBuf::from("/etc/gazette/var/storage"));
        assert_eq!(settings.bucket, "gazettes");
        assert_eq!(settings.source.listing_strategy, ListingStrategy::UrlTemplate);
        assert_eq!(settings.source.widget_id, "DropDownList1");
        assert_eq!(settings.source.base_url(), "http://gazette.test");
        assert_eq!(settings.http.timeout_secs, 5);
        assert_eq!(settings.ingest.concurrency, 2);
        assert!(!settings.browser.headless);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(ConfigFile::parse("nonsense = 1", Path::new("x.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GAZETTE_DATA_DIR", "/srv/gazette"),
            ("DATABASE_URL", "sqlite:/tmp/other.db"),
            ("GAZETTE_PUBLIC_BASE_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::with_data_dir(PathBuf::from("/data"));
        apply_env_overrides(&mut settings, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.data_dir, PathBuf::from("/srv/gazette"));
        assert_eq!(settings.storage_dir, PathBuf::from("/srv/gazette/storage"));
        assert_eq!(settings.database_url(), "sqlite:/tmp/other.db");
        // Empty values are ignored.
        assert_eq!(settings.public_base_url, "http://localhost:3030");
    }

    #[tokio::test]
    async fn test_load_explicit_config_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "storage_dir = \"blobs\"\n[ingest]\nconcurrency = 8\n").unwrap();

        let settings = load_settings(LoadOptions {
            config_path: Some(path),
            use_cwd: false,
        })
        .await
        .unwrap();

        assert_eq!(settings.storage_dir, dir.path().join("blobs"));
        assert_eq!(settings.ingest.concurrency, 8);
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().join("nested"));
        settings.ensure_directories().unwrap();
        assert!(settings.storage_dir.is_dir());
    }
}
