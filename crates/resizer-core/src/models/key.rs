//! Object keys.
//!
//! A key is derived from an uploaded file's name: runs of whitespace become a
//! single `-` and the result is lowercased. The same filename always yields the
//! same key, so two different files with the same name share a key.

use crate::constants::MAX_KEY_LENGTH;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters escaped by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("Object key must not be empty")]
    Empty,

    #[error("Object key exceeds {max} bytes ({len} bytes)")]
    TooLong { len: usize, max: usize },

    #[error("Object key contains an invalid sequence: {0}")]
    InvalidSequence(String),
}

/// Check that `key` can address an object in either bucket.
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(KeyError::TooLong {
            len: key.len(),
            max: MAX_KEY_LENGTH,
        });
    }
    if key.starts_with('/') {
        return Err(KeyError::InvalidSequence("leading '/'".to_string()));
    }
    if let Some(segment) = key
        .split('/')
        .find(|segment| segment.is_empty() || *segment == "." || *segment == "..")
    {
        return Err(KeyError::InvalidSequence(format!(
            "path segment '{}'",
            segment
        )));
    }
    if key.chars().any(char::is_control) {
        return Err(KeyError::InvalidSequence("control character".to_string()));
    }
    Ok(())
}

/// Normalized identifier of a source object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Derive a key from an original filename.
    pub fn from_filename(filename: &str) -> Self {
        let mut normalized = String::with_capacity(filename.len());
        let mut in_whitespace = false;
        for c in filename.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    normalized.push('-');
                }
                in_whitespace = true;
            } else {
                normalized.push(c);
                in_whitespace = false;
            }
        }
        ObjectKey(normalized.to_lowercase())
    }

    /// Accept an already-derived key, rejecting malformed ones.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        validate_key(raw)?;
        Ok(ObjectKey(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key escaped for use inside a URL query component.
    pub fn escaped(&self) -> String {
        utf8_percent_encode(&self.0, COMPONENT).to_string()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_key(&value)?;
        Ok(ObjectKey(value))
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}
