//! Diesel ORM models for database tables.

use diesel::prelude::*;

use super::util::{format_datetime, parse_datetime};
use crate::models::{CatalogEntry, DocumentRecord, DocumentStatus};
use crate::schema;

/// Catalog entry row.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::catalog_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CatalogEntryRow {
    pub token: String,
    pub label: String,
    pub sort_order: i32,
    pub refreshed_at: String,
}

impl From<&CatalogEntry> for CatalogEntryRow {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            token: entry.token.clone(),
            label: entry.label.clone(),
            sort_order: entry.sort_order,
            refreshed_at: format_datetime(&entry.refreshed_at),
        }
    }
}

impl From<CatalogEntryRow> for CatalogEntry {
    fn from(row: CatalogEntryRow) -> Self {
        CatalogEntry {
            label: row.label,
            token: row.token,
            sort_order: row.sort_order,
            refreshed_at: parse_datetime(&row.refreshed_at),
        }
    }
}

/// Document row.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentRow {
    pub id: String,
    pub name: String,
    pub status: String,
    pub storage_key: Option<String>,
    pub source_url: Option<String>,
    pub issue_token: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&DocumentRecord> for DocumentRow {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.name.clone(),
            status: doc.status.as_str().to_string(),
            storage_key: doc.storage_key.clone(),
            source_url: doc.source_url.clone(),
            issue_token: doc.issue_token.clone(),
            created_at: format_datetime(&doc.created_at),
            updated_at: format_datetime(&doc.updated_at),
        }
    }
}

impl From<DocumentRow> for DocumentRecord {
    fn from(row: DocumentRow) -> Self {
        DocumentRecord {
            id: row.id,
            name: row.name,
            // Rows written by other tools may carry unknown labels.
            status: DocumentStatus::from_str(&row.status).unwrap_or(DocumentStatus::Pending),
            storage_key: row.storage_key,
            source_url: row.source_url,
            issue_token: row.issue_token,
            created_at: parse_datetime(&row.created_at),
            updated_at: parse_datetime(&row.updated_at),
        }
    }
}
