//! Image processing module

pub mod transformer;

pub use transformer::{ImageTransformer, TransformError};
