//! HTTP request handlers for the web server.

mod catalog;
mod documents;
mod files;
mod functions;
mod helpers;
mod types;

pub use catalog::list_catalog;
pub use documents::{
    bulk_delete_documents, delete_document, list_documents, parse_document, preview_document,
};
pub use files::serve_file;
pub use functions::{crawl_pdfs, scrape_dates};
