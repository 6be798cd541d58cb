//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers;
use resizer_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Resizer API",
        version = "0.1.0",
        description = "Upload URL issuance and forced-fit JPEG resizing"
    ),
    paths(
        handlers::upload_url::issue_upload_url,
        handlers::resize::resize_image,
        handlers::health::health_check,
    ),
    components(schemas(models::UploadUrlResponse)),
    tags(
        (name = "uploads", description = "Direct-to-storage upload URLs"),
        (name = "transform", description = "Image resizing"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn openapi_document() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
