#[cfg(feature = "storage-local")]
use crate::{LocalStorage, UploadSigner};
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use resizer_core::Config;
use std::sync::Arc;

/// The two buckets the service works with.
#[derive(Clone)]
pub struct StorageSet {
    /// Raw uploads land here
    pub source: Arc<dyn Storage>,
    /// Resized outputs are written here
    pub destination: Arc<dyn Storage>,
    /// Concrete handles when the local backend is active, used by the
    /// object routes that stand in for the bucket's HTTP endpoint
    #[cfg(feature = "storage-local")]
    pub local: Option<LocalBuckets>,
}

#[cfg(feature = "storage-local")]
#[derive(Clone)]
pub struct LocalBuckets {
    pub source: Arc<LocalStorage>,
    pub destination: Arc<LocalStorage>,
}

#[cfg(feature = "storage-local")]
impl LocalBuckets {
    /// Look up a bucket by name
    pub fn get(&self, bucket: &str) -> Option<&Arc<LocalStorage>> {
        if self.source.bucket() == bucket {
            Some(&self.source)
        } else if self.destination.bucket() == bucket {
            Some(&self.destination)
        } else {
            None
        }
    }
}

#[cfg(feature = "storage-local")]
impl StorageSet {
    pub fn from_local(source: LocalStorage, destination: LocalStorage) -> Self {
        let source = Arc::new(source);
        let destination = Arc::new(destination);
        StorageSet {
            source: source.clone(),
            destination: destination.clone(),
            local: Some(LocalBuckets {
                source,
                destination,
            }),
        }
    }
}

/// Create both buckets based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<StorageSet> {
    let storage = &config.storage;

    match storage.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let source = S3Storage::new(
                storage.source_bucket.clone(),
                storage.region.clone(),
                storage.s3_endpoint.clone(),
            )
            .await?;
            let destination = S3Storage::new(
                storage.dest_bucket.clone(),
                storage.region.clone(),
                storage.s3_endpoint.clone(),
            )
            .await?
            .with_public_base_url(storage.public_base_url.clone());

            Ok(StorageSet {
                source: Arc::new(source),
                destination: Arc::new(destination),
                #[cfg(feature = "storage-local")]
                local: None,
            })
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let secret = storage.upload_signing_secret.clone().ok_or_else(|| {
                StorageError::ConfigError("UPLOAD_SIGNING_SECRET not configured".to_string())
            })?;
            let signer = Arc::new(UploadSigner::new(secret.into_bytes()));

            let source = LocalStorage::new(
                &storage.local_storage_path,
                storage.local_storage_base_url.clone(),
                storage.source_bucket.clone(),
            )
            .await?
            .with_signer(signer.clone());
            let destination = LocalStorage::new(
                &storage.local_storage_path,
                storage.local_storage_base_url.clone(),
                storage.dest_bucket.clone(),
            )
            .await?
            .with_signer(signer);

            Ok(StorageSet::from_local(source, destination))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
