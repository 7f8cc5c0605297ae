//! Media upload handler.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ErrorResponse;
use crate::services::upload::{cleanup_and_respond, Completion, UploadService};
use crate::state::AppState;

/// Successful upload response: the stored media path.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub filename: String,
}

/// Upload media handler
///
/// Streams the first file field of a multipart request to content storage,
/// enforcing the configured size limit while the body arrives. Temp spool
/// files for every file field are deleted concurrently before the response is
/// sent, whatever the outcome.
///
/// # Errors
/// - `AppError::SizeExceeded` - cumulative or declared size over the limit (413)
/// - `AppError::NoFilesSubmitted` - no file fields in the form (500)
/// - `AppError::Multipart` - body could not be parsed (500)
/// - `AppError::Storage` - storage collaborator failure (500)
#[utoipa::path(
    post,
    path = "/api/v0/media",
    tag = "media",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Media stored successfully", body = UploadResponse),
        (status = 413, description = "Upload exceeds the configured size limit", body = ErrorResponse),
        (status = 500, description = "No file fields, parse failure, or storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_media"))]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let completion = Completion::default();
    let service = UploadService::new(state.media.storage.clone(), &state.media);

    let declared_total = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    let mut form = service.receive_form(declared_total, &mut multipart).await;

    let outcome = match form.fault.take() {
        Some(fault) => Err(fault),
        None => service.store_first_file(&form).await.map(|stored| {
            Json(UploadResponse {
                filename: stored.media_path,
            })
        }),
    };

    match cleanup_and_respond(outcome, &form, &completion).await {
        Some(response) => response,
        // The completion flag is fresh for this request, so the first pass owns it.
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
