//! HTTP surface: the pipeline trigger endpoints, the document management
//! API, and blob serving.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::Result;
use crate::repository::DbContext;
use crate::scrapers::HttpClient;
use crate::services::{self, CatalogService, DocumentService, IngestService};
use crate::storage::BlobStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub ctx: DbContext,
    pub blobs: Arc<dyn BlobStore>,
    pub client: HttpClient,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            settings: Arc::new(settings.clone()),
            ctx: settings.create_db_context(),
            blobs: Arc::new(settings.create_blob_store()),
            client: settings.create_http_client()?,
        })
    }

    pub fn catalog_service(&self) -> Result<CatalogService> {
        services::catalog_service(&self.settings, self.ctx.clone(), &self.client)
    }

    pub fn ingest_service(&self) -> Result<IngestService> {
        services::ingest_service(
            &self.settings,
            self.ctx.clone(),
            self.blobs.clone(),
            &self.client,
        )
    }

    pub fn document_service(&self) -> DocumentService {
        DocumentService::new(self.ctx.clone(), self.blobs.clone())
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let state = AppState::new(settings)?;
    state.ctx.init_schema().await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
