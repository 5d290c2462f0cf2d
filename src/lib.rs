//! Gazette harvester: scrapes a government gazette site's issue catalog,
//! ingests the PDFs each issue links to, and serves a small management API
//! over the stored documents.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod scrapers;
pub mod server;
pub mod services;
pub mod storage;
