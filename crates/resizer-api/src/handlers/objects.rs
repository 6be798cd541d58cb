//! Object routes for the local storage backend.
//!
//! They play the part of the bucket's own HTTP endpoint: presigned upload
//! URLs point at `PUT /objects/{bucket}/{key}` and public URLs at
//! `GET /objects/{bucket}/{key}`. With the S3 backend these routes answer 404.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use resizer_core::constants::DEFAULT_UPLOAD_CONTENT_TYPE;
use resizer_core::AppError;
use resizer_storage::{LocalStorage, Storage};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SignedUploadQuery {
    pub expires: Option<u64>,
    pub signature: Option<String>,
}

fn local_bucket(state: &AppState, bucket: &str) -> Result<Arc<LocalStorage>, AppError> {
    state
        .storage
        .local
        .as_ref()
        .and_then(|local| local.get(bucket))
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("bucket {}", bucket)))
}

/// Accept a PUT against a presigned upload URL.
#[tracing::instrument(skip_all, fields(bucket = %bucket, key = %key, size_bytes = body.len()))]
pub async fn put_object(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
    Query(query): Query<SignedUploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, HttpAppError> {
    let storage = local_bucket(&state, &bucket)?;

    let (expires, signature) = match (query.expires, query.signature.as_deref()) {
        (Some(expires), Some(signature)) => (expires, signature),
        _ => {
            return Err(AppError::UploadRejected(
                "missing expires or signature parameter".to_string(),
            )
            .into())
        }
    };
    storage.verify_upload(&key, expires, signature)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_UPLOAD_CONTENT_TYPE)
        .to_string();

    storage
        .upload_with_key(&key, body.to_vec(), &content_type)
        .await?;

    Ok(StatusCode::OK)
}

/// Public read of an object.
#[tracing::instrument(skip_all, fields(bucket = %bucket, key = %key))]
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, HttpAppError> {
    let storage = local_bucket(&state, &bucket)?;

    let stream = storage.download_stream(&key).await?;
    let content_type = storage.content_type(&key).await?;

    let content_type = HeaderValue::from_str(&content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_UPLOAD_CONTENT_TYPE));

    Ok((
        [(header::CONTENT_TYPE, content_type)],
        Body::from_stream(stream),
    )
        .into_response())
}
