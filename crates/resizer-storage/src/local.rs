use crate::keys::{check_key, escape_key_path};
use crate::signing::UploadSigner;
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use resizer_core::constants::DEFAULT_UPLOAD_CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One bucket on the local filesystem.
///
/// Layout under `<base_path>/<bucket>/`:
/// - `data/<key>` object body
/// - `meta/<key>` content type of the object
/// - `tmp/` staging area, renamed into place on completion
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
    bucket: String,
    signer: Option<Arc<UploadSigner>>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory shared by all buckets (e.g., "./data")
    /// * `base_url` - Address the API is reachable on (e.g., "http://localhost:4000")
    /// * `bucket` - Bucket name, used as a directory and in object URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: impl Into<String>,
    ) -> StorageResult<Self> {
        let bucket = bucket.into();
        check_key(&bucket)
            .map_err(|_| StorageError::ConfigError(format!("Invalid bucket name: {}", bucket)))?;

        let root = base_path.into().join(&bucket);
        for dir in ["data", "meta", "tmp"] {
            let path = root.join(dir);
            fs::create_dir_all(&path).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        Ok(LocalStorage {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            signer: None,
        })
    }

    /// Enable presigned upload URLs signed with `signer`.
    pub fn with_signer(mut self, signer: Arc<UploadSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    fn data_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        check_key(storage_key)?;
        Ok(self.root.join("data").join(storage_key))
    }

    fn meta_path(&self, storage_key: &str) -> PathBuf {
        self.root.join("meta").join(storage_key)
    }

    fn tmp_path(&self) -> PathBuf {
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root
            .join("tmp")
            .join(format!("{}-{}.part", std::process::id(), n))
    }

    fn signer(&self) -> StorageResult<&UploadSigner> {
        self.signer.as_deref().ok_or_else(|| {
            StorageError::ConfigError(format!(
                "Bucket {} has no upload signing secret configured",
                self.bucket
            ))
        })
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write `data` to a staging file then rename it over `dest`. The staging
    /// file is removed on any failure.
    async fn write_atomic(&self, dest: &Path, data: &[u8]) -> StorageResult<()> {
        self.ensure_parent_dir(dest).await?;
        let tmp = self.tmp_path();

        let result = Self::stage_and_rename(&tmp, dest, data).await;
        if result.is_err() {
            let _ = fs::remove_file(&tmp).await;
        }
        result
    }

    async fn stage_and_rename(tmp: &Path, dest: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = fs::File::create(tmp).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", tmp.display(), e))
        })?;
        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", tmp.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", tmp.display(), e))
        })?;
        drop(file);

        fs::rename(tmp, dest).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to move {} into place: {}",
                dest.display(),
                e
            ))
        })
    }

    /// Content type recorded for `storage_key`, or the generic binary type
    /// when none was recorded.
    pub async fn content_type(&self, storage_key: &str) -> StorageResult<String> {
        check_key(storage_key)?;
        match fs::read_to_string(self.meta_path(storage_key)).await {
            Ok(ct) if !ct.trim().is_empty() => Ok(ct.trim().to_string()),
            Ok(_) => Ok(DEFAULT_UPLOAD_CONTENT_TYPE.to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(DEFAULT_UPLOAD_CONTENT_TYPE.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Accept a PUT against a presigned URL. The signature is consumed on
    /// success so the URL cannot be replayed.
    pub fn verify_upload(
        &self,
        storage_key: &str,
        expires_at: u64,
        signature: &str,
    ) -> StorageResult<()> {
        check_key(storage_key)?;
        self.signer()?
            .verify_and_consume(&self.bucket, storage_key, expires_at, signature)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!(
            "{}/objects/{}/{}",
            self.base_url,
            self.bucket,
            escape_key_path(storage_key)
        )
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let path = self.data_path(storage_key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        // Metadata first: a reader that sees the new body also sees its type.
        self.write_atomic(&self.meta_path(storage_key), content_type.as_bytes())
            .await?;
        self.write_atomic(&path, &data).await?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload_with_key successful"
        );

        Ok(self.public_url(storage_key))
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let path = self.data_path(storage_key)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let stream = tokio_util::io::ReaderStream::new(file).map(|result| {
            result.map_err(|e| StorageError::DownloadFailed(format!("Failed to read chunk: {}", e)))
        });

        Ok(Box::pin(stream))
    }

    async fn content_length(&self, storage_key: &str) -> StorageResult<u64> {
        let path = self.data_path(storage_key)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            Ok(_) => Err(StorageError::NotFound(storage_key.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn presigned_put_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        check_key(storage_key)?;
        let expires_at = UploadSigner::expiry_from_now(expires_in);
        let signature = self.signer()?.sign(&self.bucket, storage_key, expires_at)?;

        Ok(format!(
            "{}?expires={}&signature={}",
            self.public_url(storage_key),
            expires_at,
            signature
        ))
    }
}
