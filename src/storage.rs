//! Blob storage for downloaded PDFs.
//!
//! Blobs live on the local filesystem under `<storage_dir>/<bucket>/<path>`
//! and are served back over HTTP by the `/files` route, which is what
//! [`BlobStore::public_url`] points at.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::StorageError;

/// Prefix under which ingested PDFs are stored.
pub const PDF_PREFIX: &str = "pdfs";

/// Fallback base name when link text has no usable characters.
const FALLBACK_NAME: &str = "document";

/// Longest link-text prefix kept in a storage name.
pub const MAX_NAME_BASE_LEN: usize = 100;

/// Options for a single upload.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub content_type: String,
    /// Replace an existing blob at the same path.
    pub overwrite: bool,
}

impl UploadOptions {
    /// Non-clobbering PDF upload.
    pub fn pdf() -> Self {
        Self {
            content_type: "application/pdf".to_string(),
            overwrite: false,
        }
    }
}

/// Object store contract used by the ingestion and management services.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`. Fails with `AlreadyExists` when the blob is
    /// present and `overwrite` is off.
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        options: UploadOptions,
    ) -> Result<(), StorageError>;

    /// Remove blobs. Paths that are already gone are skipped.
    async fn remove(&self, paths: &[String]) -> Result<(), StorageError>;

    /// Read a blob back.
    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Publicly reachable URL for a blob.
    fn public_url(&self, path: &str) -> Result<String, StorageError>;

    /// Bucket name, used as the first segment of public URLs.
    fn bucket(&self) -> &str;
}

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, bucket: &str, public_base_url: &str) -> Self {
        Self {
            root,
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Directory holding this store's bucket.
    pub fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    fn blob_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        validate_blob_path(path)?;
        Ok(self.bucket_dir().join(path))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        options: UploadOptions,
    ) -> Result<(), StorageError> {
        let full = self.blob_path(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        let mut open = tokio::fs::OpenOptions::new();
        open.write(true);
        if options.overwrite {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }

        let mut file = open.open(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                StorageError::AlreadyExists(path.to_string())
            } else {
                io_error(&full, e)
            }
        })?;

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(&full).await;
            return Err(io_error(&full, e));
        }

        tracing::debug!(
            "Stored {} ({} bytes, {})",
            path,
            bytes.len(),
            options.content_type
        );
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        for path in paths {
            let full = self.blob_path(path)?;
            match tokio::fs::remove_file(&full).await {
                Ok(()) => tracing::debug!("Removed blob {}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("Blob {} already absent", path);
                }
                Err(e) => return Err(io_error(&full, e)),
            }
        }
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full = self.blob_path(path)?;
        tokio::fs::read(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(path.to_string())
            } else {
                io_error(&full, e)
            }
        })
    }

    fn public_url(&self, path: &str) -> Result<String, StorageError> {
        validate_blob_path(path)?;
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        Ok(format!(
            "{}/files/{}/{}",
            self.public_base_url,
            urlencoding::encode(&self.bucket),
            encoded.join("/")
        ))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Reject paths that could escape the bucket directory.
pub fn validate_blob_path(path: &str) -> Result<(), StorageError> {
    let invalid = || StorageError::InvalidPath(path.to_string());

    if path.is_empty() || path.starts_with('/') || path.contains('\\') || path.contains('\0') {
        return Err(invalid());
    }
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid());
        }
    }
    Ok(())
}

/// Build a collision-resistant storage file name from link text.
///
/// Only printable ASCII survives; separators and characters that upset
/// filesystems become `_`, whitespace runs collapse to a single `_`. A
/// millisecond timestamp plus 8 hex chars of a fresh UUID keep two
/// documents with the same text apart even within one batch. The cleaned
/// text is capped at [`MAX_NAME_BASE_LEN`] bytes, keeping the file name
/// under the usual 255-byte limit.
pub fn derive_storage_name(link_text: &str, now: DateTime<Utc>) -> String {
    let cleaned: String = link_text
        .chars()
        .filter(|c| (' '..='~').contains(c))
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '%' | '#' => '_',
            other => other,
        })
        .collect();

    let mut collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    // Only ASCII is left, so any byte index is a char boundary.
    collapsed.truncate(MAX_NAME_BASE_LEN);
    let base = if collapsed.is_empty() {
        FALLBACK_NAME
    } else {
        collapsed.as_str()
    };

    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}.pdf", base, now.timestamp_millis(), &uuid[..8])
}

/// Blob path for an ingested PDF.
pub fn pdf_storage_path(name: &str) -> String {
    format!("{}/{}", PDF_PREFIX, name)
}
