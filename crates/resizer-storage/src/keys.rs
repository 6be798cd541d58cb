//! Shared key handling for storage backends.

use crate::{StorageError, StorageResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is when a key is placed in a URL path. `/` stays so
/// nested keys keep their shape.
const KEY_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Reject keys that cannot address an object in any backend.
pub fn check_key(storage_key: &str) -> StorageResult<()> {
    resizer_core::validate_key(storage_key).map_err(|e| StorageError::InvalidKey(e.to_string()))
}

/// Escape a key for use as a URL path.
pub fn escape_key_path(storage_key: &str) -> String {
    utf8_percent_encode(storage_key, KEY_PATH).to_string()
}
