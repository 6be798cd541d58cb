pub mod api;
pub mod dimensions;
pub mod job;
pub mod key;

pub use api::{ResizeQuery, UploadUrlQuery, UploadUrlResponse};
pub use dimensions::{DimensionError, Dimensions};
pub use job::{OutputKeyScheme, ResizeJob};
pub use key::{validate_key, KeyError, ObjectKey};
