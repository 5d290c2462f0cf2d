//! Domain models for gazette issues and ingested documents.

mod catalog;
mod document;

pub use catalog::{CatalogEntry, CatalogOption};
pub use document::{DocumentRecord, DocumentStatus, StatusFilter};
