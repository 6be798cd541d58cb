//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Every error is
//! rendered as a plain-text body carrying the client message, with the status
//! from `ErrorMetadata` and the machine-readable code in `x-error-code`.

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use resizer_core::{AppError, DimensionError, ErrorMetadata, KeyError, LogLevel};
use resizer_processing::TransformError;
use resizer_storage::StorageError;

pub const ERROR_CODE_HEADER: &str = "x-error-code";

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: both the trait and AppError are foreign here)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<DimensionError> for HttpAppError {
    fn from(err: DimensionError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<KeyError> for HttpAppError {
    fn from(err: KeyError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<TransformError> for HttpAppError {
    fn from(err: TransformError) -> Self {
        HttpAppError(err.into())
    }
}

/// Generic storage mapping. Handlers that need a stage-specific error (source
/// read vs destination write) map explicitly instead.
impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(key) => AppError::NotFound(key),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::TooLarge { size, max } => AppError::PayloadTooLarge(format!(
                "{} bytes exceeds max {} bytes",
                size, max
            )),
            StorageError::SignatureRejected(msg) => AppError::UploadRejected(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::BackendError(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                error_type = error_type,
                details = %error.detailed_message(),
                "Error occurred"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (
            status,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                ),
                (
                    HeaderName::from_static(ERROR_CODE_HEADER),
                    HeaderValue::from_static(app_error.error_code()),
                ),
            ],
            app_error.client_message(),
        )
            .into_response()
    }
}
