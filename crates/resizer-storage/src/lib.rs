//! Resizer Storage Library
//!
//! Storage abstraction and backends for the two buckets the resizer works
//! with: a source bucket for raw uploads and a destination bucket for resized
//! outputs. Each bucket is a separate `Storage` instance.
//!
//! Keys are validated by every backend: no `..`, no leading `/`, no control
//! characters, at most 1024 bytes.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(feature = "storage-local")]
pub mod signing;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use factory::LocalBuckets;
pub use factory::{create_storage, StorageSet};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use resizer_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
#[cfg(feature = "storage-local")]
pub use signing::UploadSigner;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
