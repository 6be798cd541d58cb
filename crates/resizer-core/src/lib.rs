//! Resizer Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by the API, the storage layer, the image pipeline and the client.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, StorageConfig, TransformConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    validate_key, DimensionError, Dimensions, KeyError, ObjectKey, OutputKeyScheme, ResizeJob,
};
pub use storage_types::StorageBackend;
