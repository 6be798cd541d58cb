use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use resizer_core::models::{UploadUrlQuery, UploadUrlResponse};
use resizer_core::{validate_key, AppError};
use resizer_storage::StorageError;
use std::sync::Arc;

/// Issue a time-limited URL that accepts one PUT of the whole file into the
/// source bucket under `key`.
#[utoipa::path(
    get,
    path = "/upload-url",
    tag = "uploads",
    params(
        ("key" = String, Query, description = "Object key the upload will be stored under")
    ),
    responses(
        (status = 200, description = "Upload URL issued", body = UploadUrlResponse),
        (status = 400, description = "Missing or malformed key", body = String, content_type = "text/plain"),
        (status = 500, description = "Storage backend could not sign the URL", body = String, content_type = "text/plain")
    )
)]
#[tracing::instrument(skip(state, query), fields(key = ?query.key, operation = "issue_upload_url"))]
pub async fn issue_upload_url(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadUrlQuery>,
) -> Result<Json<UploadUrlResponse>, HttpAppError> {
    let key = query
        .key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing key parameter".to_string()))?;
    validate_key(key)?;

    let expires_in = state.config.storage.upload_url_expiry;
    let upload_url = state
        .storage
        .source
        .presigned_put_url(key, expires_in)
        .await
        .map_err(|e| match e {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Issuance(other.to_string()),
        })?;

    tracing::info!(
        bucket = %state.storage.source.bucket(),
        key = %key,
        expires_in_secs = expires_in.as_secs(),
        "Upload URL issued"
    );

    Ok(Json(UploadUrlResponse { upload_url }))
}
