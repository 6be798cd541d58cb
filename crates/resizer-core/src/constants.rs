//! Fixed policy values shared by the server and the client.

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: u32 = 3000;

/// Prefix applied to a source key to form its destination key.
pub const OUTPUT_KEY_PREFIX: &str = "resized-";

/// Content type of every object written to the destination bucket.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// Content type used for uploads whose type is unknown.
pub const DEFAULT_UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Longest accepted object key, in bytes (S3 limit).
pub const MAX_KEY_LENGTH: usize = 1024;

pub const DEFAULT_SOURCE_BUCKET: &str = "src-bucket99";
pub const DEFAULT_DEST_BUCKET: &str = "dest-bucket99";
pub const DEFAULT_REGION: &str = "us-east-1";

pub const DEFAULT_UPLOAD_URL_EXPIRY_SECS: u64 = 300;
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_JPEG_QUALITY: u8 = 80;
