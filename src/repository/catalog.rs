//! Diesel-based catalog repository for SQLite.

use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::CatalogEntryRow;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::CatalogEntry;
use crate::schema::catalog_entries;

/// Stores the set of known gazette issues.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: AsyncSqlitePool,
}

impl DieselCatalogRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Replace the whole catalog with `entries`.
    ///
    /// Delete and inserts share one transaction: readers never see an empty
    /// catalog, and a failed insert restores the previous set.
    pub async fn replace_all(&self, entries: &[CatalogEntry]) -> Result<usize, DieselError> {
        let rows: Vec<CatalogEntryRow> = entries.iter().map(CatalogEntryRow::from).collect();
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                diesel::delete(catalog_entries::table)
                    .execute(conn)
                    .await?;

                let mut written = 0;
                for row in &rows {
                    written += diesel::insert_into(catalog_entries::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                }

                Ok(written)
            })
        })
        .await
    }

    /// All entries in source-page order.
    pub async fn list(&self) -> Result<Vec<CatalogEntry>, DieselError> {
        let mut conn = self.pool.get().await?;

        catalog_entries::table
            .order(catalog_entries::sort_order.asc())
            .select(CatalogEntryRow::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(CatalogEntry::from).collect())
    }

    /// Look up one entry by token.
    pub async fn get(&self, token: &str) -> Result<Option<CatalogEntry>, DieselError> {
        let mut conn = self.pool.get().await?;

        catalog_entries::table
            .find(token)
            .select(CatalogEntryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(CatalogEntry::from))
    }

    pub async fn count(&self) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        catalog_entries::table
            .count()
            .get_result(&mut conn)
            .await
    }
}
