//! Resizer Processing Library
//!
//! Decode, forced-fit resize and JPEG re-encode of uploaded images. All
//! functions here are CPU-bound and synchronous; callers on an async runtime
//! run them through `spawn_blocking`.

pub mod image;

pub use self::image::{ImageTransformer, TransformError};
