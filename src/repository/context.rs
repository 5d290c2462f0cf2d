//! Database context for managing connections and repository access.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::catalog::DieselCatalogRepository;
use super::document::DieselDocumentRepository;
use super::pool::{AsyncSqlitePool, DieselError};

/// Entry point for database operations. Create one per command or service,
/// then use it to access the repositories.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_url("sqlite:gazette.db");
/// ctx.init_schema().await?;
/// let issues = ctx.catalog().list().await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a context from a database URL (`sqlite:path` or a plain path).
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    /// Create a context from a database file path.
    pub fn from_path(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    pub fn catalog(&self) -> DieselCatalogRepository {
        DieselCatalogRepository::new(self.pool.clone())
    }

    pub fn documents(&self) -> DieselDocumentRepository {
        DieselDocumentRepository::new(self.pool.clone())
    }

    /// Create the tables if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            PRAGMA journal_mode = WAL;

            -- Issues offered by the source site's dropdown
            CREATE TABLE IF NOT EXISTS catalog_entries (
                token TEXT PRIMARY KEY,
                label TEXT NOT NULL,
                sort_order INTEGER NOT NULL,
                refreshed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_catalog_entries_sort_order
                ON catalog_entries(sort_order);

            -- Ingested PDFs
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                storage_key TEXT,
                source_url TEXT,
                issue_token TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_created_at
                ON documents(created_at);
            CREATE INDEX IF NOT EXISTS idx_documents_status
                ON documents(status);
            "#,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));

        ctx.init_schema().await.unwrap();
        ctx.init_schema().await.unwrap();

        assert_eq!(ctx.catalog().count().await.unwrap(), 0);
        assert!(ctx.documents().list().await.unwrap().is_empty());
    }
}
