//! End-to-end pipeline tests against a local fixture of the gazette site.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use axum::extract::Path as UrlPath;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Form, Router};
use tempfile::TempDir;

use gazette_harvest::config::{ListingStrategy, Settings};
use gazette_harvest::error::HarvestError;
use gazette_harvest::models::DocumentStatus;
use gazette_harvest::server::AppState;

const SOURCE_PAGE: &str = r#"<html><body>
<form method="post" action="./jurnal.aspx" id="form1">
  <input type="hidden" name="__VIEWSTATE" value="vs-1" />
  <input type="hidden" name="__EVENTVALIDATION" value="ev-1" />
  <select name="DropDownList1" id="DropDownList1" onchange="__doPostBack('DropDownList1','')">
    <option value="">-- اختر العدد --</option>
    <option value="12-2024">ديسمبر 2024</option>
    <option value="11-2024">نوفمبر 2024</option>
    <option value="10-2024">أكتوبر 2024</option>
  </select>
</form>
</body></html>"#;

const EMPTY_WIDGET_PAGE: &str = r#"<html><body>
<select id="DropDownList1" name="DropDownList1"><option value="">--</option></select>
</body></html>"#;

fn issue_page() -> String {
    r#"<html><body>
<a href="/pdfs/first.pdf">Gazette Part 1</a>
<a href="pdfs/second.PDF">Gazette Part 2</a>
<a href="/pdfs/broken.pdf">Gazette Part 3</a>
<a href="/about.html">About</a>
</body></html>"#
        .to_string()
}

async fn source_page() -> Html<&'static str> {
    Html(SOURCE_PAGE)
}

async fn postback(Form(fields): Form<HashMap<String, String>>) -> Html<String> {
    let valid = fields.get("__VIEWSTATE").map(String::as_str) == Some("vs-1")
        && fields.get("__EVENTTARGET").map(String::as_str) == Some("DropDownList1")
        && fields.get("DropDownList1").map(String::as_str) == Some("12-2024");
    if valid {
        Html(issue_page())
    } else {
        Html("<html><body>No issue selected</body></html>".to_string())
    }
}

async fn issue(UrlPath(token): UrlPath<String>) -> Html<String> {
    if token == "empty" {
        Html("<html><body><p>Nothing here yet</p></body></html>".to_string())
    } else if token == "omega" {
        Html(
            r#"<html><body>
<a href="/pdfs/omega-1.pdf">Ω_Gazette</a>
<a href="/pdfs/omega-2.pdf">Ω_Gazette</a>
</body></html>"#
                .to_string(),
        )
    } else {
        Html(issue_page())
    }
}

async fn pdf(UrlPath(name): UrlPath<String>) -> impl IntoResponse {
    if name == "broken.pdf" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Vec::new());
    }
    (StatusCode::OK, format!("%PDF-1.4 {}", name).into_bytes())
}

async fn start_fixture() -> SocketAddr {
    let app = Router::new()
        .route("/jurnal.aspx", get(source_page).post(postback))
        .route("/empty.aspx", get(|| async { Html(EMPTY_WIDGET_PAGE) }))
        .route("/issue/:token", get(issue))
        .route("/pdfs/:name", get(pdf));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn settings_for(dir: &TempDir, addr: SocketAddr) -> Settings {
    let mut settings = Settings::with_data_dir(dir.path().to_path_buf());
    settings.source.url = format!("http://{}/jurnal.aspx", addr);
    settings.http.timeout_secs = 5;
    settings
}

async fn open(settings: &Settings, with_schema: bool) -> AppState {
    settings.ensure_directories().unwrap();
    let state = AppState::new(settings).unwrap();
    if with_schema {
        state.ctx.init_schema().await.unwrap();
    }
    state
}

fn stored_pdfs(settings: &Settings) -> usize {
    let dir = settings.storage_dir.join(&settings.bucket).join("pdfs");
    if !Path::new(&dir).exists() {
        return 0;
    }
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_catalog_refresh_from_static_page() {
    let addr = start_fixture().await;
    let dir = TempDir::new().unwrap();
    let settings = settings_for(&dir, addr);
    let state = open(&settings, true).await;

    let service = state.catalog_service().unwrap();
    assert_eq!(service.refresh(None).await.unwrap(), 3);
    // Refreshing again replaces rather than appends.
    assert_eq!(service.refresh(None).await.unwrap(), 3);

    let entries = service.list().await.unwrap();
    let tokens: Vec<_> = entries.iter().map(|e| e.token.as_str()).collect();
    assert_eq!(tokens, vec!["12-2024", "11-2024", "10-2024"]);
    assert_eq!(entries[0].label, "ديسمبر 2024");
}

#[tokio::test]
async fn test_empty_widget_keeps_previous_catalog() {
    let addr = start_fixture().await;
    let dir = TempDir::new().unwrap();
    let mut settings = settings_for(&dir, addr);
    let state = open(&settings, true).await;
    state.catalog_service().unwrap().refresh(None).await.unwrap();

    settings.source.url = format!("http://{}/empty.aspx", addr);
    let state = open(&settings, true).await;
    let err = state
        .catalog_service()
        .unwrap()
        .refresh(None)
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::EmptyResult(_)));
    assert_eq!(state.ctx.catalog().count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_ingest_via_url_template_skips_failed_download() {
    let addr = start_fixture().await;
    let dir = TempDir::new().unwrap();
    let mut settings = settings_for(&dir, addr);
    settings.source.listing_strategy = ListingStrategy::UrlTemplate;
    settings.source.url_template = Some(format!("http://{}/issue/{{token}}", addr));
    let state = open(&settings, true).await;

    let summary = state
        .ingest_service()
        .unwrap()
        .ingest("12-2024")
        .await
        .unwrap();

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].name, "Gazette Part 3");
    assert!(summary.failed[0].url.ends_with("/pdfs/broken.pdf"));

    let docs = state.ctx.documents().list().await.unwrap();
    assert_eq!(docs.len(), 2);
    let mut names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Gazette Part 1", "Gazette Part 2"]);
    for doc in &docs {
        assert_eq!(doc.status, DocumentStatus::Pending);
        assert_eq!(doc.issue_token.as_deref(), Some("12-2024"));
        let key = doc.storage_key.as_deref().unwrap();
        assert!(key.starts_with("pdfs/Gazette_Part_"));
        assert!(key.ends_with(".pdf"));
    }
    assert_eq!(stored_pdfs(&settings), 2);
}

#[tokio::test]
async fn test_identical_link_text_gets_distinct_blobs() {
    let addr = start_fixture().await;
    let dir = TempDir::new().unwrap();
    let mut settings = settings_for(&dir, addr);
    settings.source.listing_strategy = ListingStrategy::UrlTemplate;
    settings.source.url_template = Some(format!("http://{}/issue/{{token}}", addr));
    settings.ingest.concurrency = 4;
    let state = open(&settings, true).await;

    let summary = state
        .ingest_service()
        .unwrap()
        .ingest("omega")
        .await
        .unwrap();
    assert_eq!(summary.processed, 2);

    let docs = state.ctx.documents().list().await.unwrap();
    assert_eq!(docs.len(), 2);
    let keys: Vec<_> = docs
        .iter()
        .map(|d| d.storage_key.clone().unwrap())
        .collect();
    assert_ne!(keys[0], keys[1]);
    for (doc, key) in docs.iter().zip(&keys) {
        assert_eq!(doc.name, "Ω_Gazette");
        assert!(key.chars().all(|c| (' '..='~').contains(&c)), "{}", key);
    }
    assert_eq!(stored_pdfs(&settings), 2);
}

#[tokio::test]
async fn test_ingest_via_form_postback() {
    let addr = start_fixture().await;
    let dir = TempDir::new().unwrap();
    let settings = settings_for(&dir, addr);
    let state = open(&settings, true).await;

    let summary = state
        .ingest_service()
        .unwrap()
        .ingest("12-2024")
        .await
        .unwrap();
    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.processed, 2);

    // A different token gets the fixture's "nothing selected" page.
    let err = state
        .ingest_service()
        .unwrap()
        .ingest("11-2024")
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::NoDocuments(_)));
}

#[tokio::test]
async fn test_issue_without_links_persists_nothing() {
    let addr = start_fixture().await;
    let dir = TempDir::new().unwrap();
    let mut settings = settings_for(&dir, addr);
    settings.source.listing_strategy = ListingStrategy::UrlTemplate;
    settings.source.url_template = Some(format!("http://{}/issue/{{token}}", addr));
    let state = open(&settings, true).await;

    let err = state
        .ingest_service()
        .unwrap()
        .ingest("empty")
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::NoDocuments(_)));
    assert_eq!(state.ctx.documents().count().await.unwrap(), 0);
    assert_eq!(stored_pdfs(&settings), 0);
}

#[tokio::test]
async fn test_failed_insert_removes_uploaded_blob() {
    let addr = start_fixture().await;
    let dir = TempDir::new().unwrap();
    let mut settings = settings_for(&dir, addr);
    settings.source.listing_strategy = ListingStrategy::UrlTemplate;
    settings.source.url_template = Some(format!("http://{}/issue/{{token}}", addr));
    // No schema: every insert fails after the upload succeeded.
    let state = open(&settings, false).await;

    let summary = state
        .ingest_service()
        .unwrap()
        .ingest("12-2024")
        .await
        .unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.failed.len(), 3);
    assert_eq!(stored_pdfs(&settings), 0);
}
