//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking on
//! SQLite through diesel-async's `SyncConnectionWrapper`.

pub mod catalog;
pub mod context;
pub mod document;
pub mod models;
pub mod pool;
pub mod util;

pub use catalog::DieselCatalogRepository;
pub use context::DbContext;
pub use document::DieselDocumentRepository;
pub use pool::{AsyncSqlitePool, DieselError};
pub use util::{format_datetime, parse_datetime};
