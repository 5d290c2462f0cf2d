//! Router configuration for the web server.

use axum::{
    http::{header, HeaderName, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::AppState;

/// Headers browser clients send with function calls.
const ALLOWED_HEADERS: [HeaderName; 4] = [
    header::AUTHORIZATION,
    HeaderName::from_static("x-client-info"),
    HeaderName::from_static("apikey"),
    header::CONTENT_TYPE,
];

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(ALLOWED_HEADERS)
}

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Pipeline triggers
        .route("/functions/scrape-dates", post(handlers::scrape_dates))
        .route("/functions/crawl-pdfs", post(handlers::crawl_pdfs))
        .route("/api/catalog/refresh", post(handlers::scrape_dates))
        .route("/api/ingest", post(handlers::crawl_pdfs))
        // Catalog and document table
        .route("/api/catalog", get(handlers::list_catalog))
        .route("/api/documents", get(handlers::list_documents))
        .route(
            "/api/documents/bulk-delete",
            post(handlers::bulk_delete_documents),
        )
        .route("/api/documents/:id", delete(handlers::delete_document))
        .route(
            "/api/documents/:id/preview",
            get(handlers::preview_document),
        )
        .route("/api/documents/:id/parse", post(handlers::parse_document))
        // Blob serving
        .route("/files/*path", get(handlers::serve_file))
        .layer(cors_layer())
        .with_state(state)
}
