//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement, so the upload handler can work with any backend without
//! coupling to implementation details.

use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Location of a stored media file: the internal storage key plus the public
/// media path handed back to upload clients and embed renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub storage_key: String,
    pub media_path: String,
}

/// Storage abstraction trait
///
/// **Key format:** `media/{uuid}.{ext}`, with the extension taken from the
/// original filename when it is a plain ascii-alphanumeric one.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stream a file's content into storage under a fresh uuid-based name.
    ///
    /// The reader is consumed until EOF; the original filename only
    /// contributes its extension. Returns the storage key and public path.
    async fn store_stream(
        &self,
        original_filename: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StoredMedia>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing key succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
