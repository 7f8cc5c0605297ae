//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Embedia API",
        version = "0.1.0",
        description = "Media upload API for the Embedia CMS plugin surface. Accepts multipart uploads, stores them through the configured storage backend, and returns the stored media path. All endpoints are versioned under /api/v0/."
    ),
    paths(handlers::media_upload::upload_media),
    components(schemas(
        handlers::media_upload::UploadResponse,
        handlers::health::HealthCheckResponse,
        error::ErrorResponse
    )),
    tags(
        (name = "media", description = "Media upload endpoints")
    )
)]
pub struct ApiDoc;
