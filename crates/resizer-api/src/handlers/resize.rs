use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::{Query, State};
use resizer_core::constants::OUTPUT_CONTENT_TYPE;
use resizer_core::models::ResizeQuery;
use resizer_core::{AppError, Dimensions, ObjectKey, ResizeJob};
use resizer_processing::ImageTransformer;
use resizer_storage::StorageError;
use std::sync::Arc;

/// Resize the uploaded object at `key` to exactly `width`×`height`, publish it
/// as JPEG in the destination bucket and return its public URL as plain text.
#[utoipa::path(
    get,
    path = "/resize",
    tag = "transform",
    params(
        ("key" = String, Query, description = "Source object key"),
        ("width" = u32, Query, description = "Target width in pixels, 1..=3000"),
        ("height" = u32, Query, description = "Target height in pixels, 1..=3000")
    ),
    responses(
        (status = 200, description = "Public URL of the resized image", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing or invalid parameters", body = String, content_type = "text/plain"),
        (status = 404, description = "Source object not found", body = String, content_type = "text/plain"),
        (status = 413, description = "Source object too large", body = String, content_type = "text/plain"),
        (status = 422, description = "Source object is not a decodable image", body = String, content_type = "text/plain"),
        (status = 502, description = "Resized image could not be written", body = String, content_type = "text/plain")
    )
)]
#[tracing::instrument(
    skip(state, query),
    fields(
        key = ?query.key,
        width = ?query.width,
        height = ?query.height,
        operation = "resize_image"
    )
)]
pub async fn resize_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResizeQuery>,
) -> Result<String, HttpAppError> {
    let transform = &state.config.transform;

    let key = query
        .key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing key parameter".to_string()))?;
    let source_key = ObjectKey::parse(key)?;
    let dimensions = Dimensions::from_query(
        query.width.as_deref(),
        query.height.as_deref(),
        transform.max_dimension,
    )?;
    let job = ResizeJob::new(source_key, dimensions, transform.output_key_scheme);

    let start = std::time::Instant::now();

    let data = state
        .storage
        .source
        .download_bounded(job.source_key.as_str(), transform.max_source_bytes)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) => AppError::SourceNotFound(job.source_key.to_string()),
            StorageError::TooLarge { size, max } => {
                AppError::PayloadTooLarge(format!("{} bytes exceeds max {} bytes", size, max))
            }
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        })?;
    let source_bytes = data.len();

    let quality = transform.jpeg_quality;
    let output = tokio::task::spawn_blocking(move || {
        ImageTransformer::resize_to_jpeg(&data, &dimensions, quality)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Resize task failed: {}", e)))??;
    let output_bytes = output.len();

    let url = state
        .storage
        .destination
        .upload_with_key(&job.output_key, output.to_vec(), OUTPUT_CONTENT_TYPE)
        .await
        .map_err(|e| AppError::Write(e.to_string()))?;

    tracing::info!(
        key = %job.source_key,
        output_key = %job.output_key,
        dimensions = %job.dimensions,
        source_bytes = source_bytes,
        size_bytes = output_bytes,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Image resized"
    );

    Ok(url)
}
