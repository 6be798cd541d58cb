//! Wire types shared by the API handlers and the client.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Query for `GET /upload-url`
#[derive(Debug, Deserialize)]
pub struct UploadUrlQuery {
    pub key: Option<String>,
}

/// Response body of `GET /upload-url`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    /// Time-limited URL accepting a single PUT of the whole file
    pub upload_url: String,
}

/// Query for `GET /resize`. Every field is optional so missing or malformed
/// values produce a plain-text 400 instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct ResizeQuery {
    pub key: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}
