//! Storage abstraction trait
//!
//! This module defines the Storage trait that every bucket backend implements.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Object is {size} bytes, limit is {max} bytes")]
    TooLarge { size: u64, max: usize },

    #[error("Upload signature rejected: {0}")]
    SignatureRejected(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunks of an object's body as they arrive from the backend.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// One bucket.
///
/// Writes replace the whole object atomically: a concurrent reader sees either
/// the previous body or the new one, never a mix.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Name of the bucket this instance addresses
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Publicly resolvable address of `storage_key`
    fn public_url(&self, storage_key: &str) -> String;

    /// Write `data` under `storage_key`, replacing any existing object.
    /// Returns the public URL of the written object.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Download an object as a stream
    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Size in bytes of an object, `NotFound` if it does not exist
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Generate a time-limited URL that accepts one whole-body HTTP PUT to
    /// `storage_key`. Creates nothing in the bucket.
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Read a whole object into memory, refusing objects over `max_bytes`.
    ///
    /// The size is checked up front and again while streaming, since the
    /// object may be replaced between the two calls.
    async fn download_bounded(&self, storage_key: &str, max_bytes: usize) -> StorageResult<Vec<u8>> {
        let size = self.content_length(storage_key).await?;
        if size > max_bytes as u64 {
            return Err(StorageError::TooLarge {
                size,
                max: max_bytes,
            });
        }

        let mut stream = self.download_stream(storage_key).await?;
        let mut buffer = Vec::with_capacity(size as usize);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if buffer.len() + chunk.len() > max_bytes {
                return Err(StorageError::TooLarge {
                    size: (buffer.len() + chunk.len()) as u64,
                    max: max_bytes,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(buffer)
    }
}
