//! Diesel-based document repository for SQLite.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::DocumentRow;
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::format_datetime;
use crate::models::{DocumentRecord, DocumentStatus};
use crate::schema::documents;

/// Metadata rows for ingested PDFs.
#[derive(Clone)]
pub struct DieselDocumentRepository {
    pool: AsyncSqlitePool,
}

impl DieselDocumentRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new document row.
    pub async fn insert(&self, doc: &DocumentRecord) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(documents::table)
            .values(DocumentRow::from(doc))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Get a document by ID.
    pub async fn get(&self, id: &str) -> Result<Option<DocumentRecord>, DieselError> {
        let mut conn = self.pool.get().await?;

        documents::table
            .find(id)
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(DocumentRecord::from))
    }

    /// All documents, newest first.
    pub async fn list(&self) -> Result<Vec<DocumentRecord>, DieselError> {
        let mut conn = self.pool.get().await?;

        documents::table
            .order((documents::created_at.desc(), documents::id.asc()))
            .select(DocumentRow::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(DocumentRecord::from).collect())
    }

    /// Update document status. Returns false when the id is unknown.
    pub async fn update_status(&self, id: &str, status: DocumentStatus) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        let updated_at = format_datetime(&Utc::now());

        let rows = diesel::update(documents::table.find(id))
            .set((
                documents::status.eq(status.as_str()),
                documents::updated_at.eq(&updated_at),
            ))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    /// Delete a document row. Returns false when the id is unknown.
    pub async fn delete(&self, id: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::delete(documents::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    pub async fn count(&self) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        documents::table.count().get_result(&mut conn).await
    }
}
