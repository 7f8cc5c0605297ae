//! Media upload service
//!
//! Streams one multipart request's file fields to temp spool files while
//! enforcing the configured size limit, hands the first file to the storage
//! collaborator, and owns the cleanup-then-respond sequence.

use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Multipart;
use axum::response::{IntoResponse, Response};
use embedia_core::AppError;
use embedia_storage::{Storage, StoredMedia};
use tokio::io::{AsyncRead, AsyncWriteExt};

use super::types::{Completion, FileDescriptor, ReceivedForm};
use crate::error::HttpAppError;

/// Upload limits seam: what the upload pipeline needs to know about its
/// configuration, without depending on the whole application state.
pub trait UploadLimits {
    /// Maximum accepted upload size in bytes, enforced while streaming.
    fn max_upload_size_bytes(&self) -> u64;
}

/// Media upload service, constructed per request from the injected storage
/// collaborator and limits.
pub struct UploadService {
    storage: Arc<dyn Storage>,
    max_upload_size: u64,
}

impl UploadService {
    pub fn new(storage: Arc<dyn Storage>, limits: &dyn UploadLimits) -> Self {
        Self {
            storage,
            max_upload_size: limits.max_upload_size_bytes(),
        }
    }

    /// Parse the multipart body as a stream.
    ///
    /// Every file field is spooled to its own temp file in field order.
    /// Cumulative received bytes (and the declared total, when present) are
    /// checked against the limit on every chunk. Crossing the limit records
    /// a size fault exactly once and stops spooling, but the remaining body
    /// is still drained: the transport keeps delivering data after the
    /// logical abort, and the first recorded fault must stay the one that is
    /// reported.
    pub async fn receive_form(
        &self,
        declared_total: Option<u64>,
        multipart: &mut Multipart,
    ) -> ReceivedForm {
        let mut form = ReceivedForm::default();
        let mut received: u64 = 0;
        let mut limit_tripped = false;

        if let Some(expected) = declared_total {
            if expected > self.max_upload_size {
                limit_tripped = true;
                form.record_fault(self.size_fault(expected));
            }
        }

        loop {
            let mut field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(err) => {
                    form.record_fault(AppError::Multipart(err.to_string()));
                    break;
                }
            };

            let Some(original_filename) = field.file_name().map(str::to_string) else {
                // Plain form fields carry no file; drain and drop them, but
                // their bytes still count toward the request total.
                while let Ok(Some(chunk)) = field.chunk().await {
                    received += chunk.len() as u64;
                    self.note_received(received, &mut limit_tripped, &mut form);
                }
                continue;
            };
            let field_name = field.name().unwrap_or_default().to_string();

            let mut descriptor = FileDescriptor::new(field_name, original_filename);
            let mut writer = if limit_tripped {
                None
            } else {
                match spool_target() {
                    Ok((file, path)) => {
                        descriptor.temp_path = Some(path);
                        Some(file)
                    }
                    Err(err) => {
                        form.record_fault(err);
                        None
                    }
                }
            };

            loop {
                match field.chunk().await {
                    Ok(Some(chunk)) => {
                        received += chunk.len() as u64;
                        if self.note_received(received, &mut limit_tripped, &mut form) {
                            writer = None;
                            continue;
                        }
                        if let Some(file) = writer.as_mut() {
                            if let Err(err) = file.write_all(&chunk).await {
                                form.record_fault(AppError::from(err));
                                writer = None;
                                continue;
                            }
                            descriptor.bytes_received += chunk.len() as u64;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        form.record_fault(AppError::Multipart(err.to_string()));
                        break;
                    }
                }
            }

            if let Some(mut file) = writer.take() {
                if let Err(err) = file.flush().await {
                    form.record_fault(AppError::from(err));
                }
            }
            form.files.push(descriptor);
        }

        form
    }

    /// Select the first file field (field insertion order) and stream its
    /// spool file to the storage collaborator.
    pub async fn store_first_file(&self, form: &ReceivedForm) -> Result<StoredMedia, AppError> {
        let descriptor = form.first_file().ok_or(AppError::NoFilesSubmitted)?;
        let temp_path = descriptor.temp_path.as_deref().ok_or_else(|| {
            AppError::Internal(format!(
                "No spool file for upload field '{}'",
                descriptor.field_name
            ))
        })?;

        let file = tokio::fs::File::open(temp_path).await?;
        let reader: Pin<Box<dyn AsyncRead + Send + Unpin>> = Box::pin(file);

        self.storage
            .store_stream(&descriptor.original_filename, reader)
            .await
            .map_err(|err| AppError::Storage(err.to_string()))
    }

    /// Check the running byte count against the limit. Returns true when the
    /// limit is (or already was) exceeded; the fault and the log line fire
    /// only on the first crossing, however long the stream keeps delivering.
    fn note_received(
        &self,
        received: u64,
        limit_tripped: &mut bool,
        form: &mut ReceivedForm,
    ) -> bool {
        if received <= self.max_upload_size {
            return *limit_tripped;
        }
        if !*limit_tripped {
            *limit_tripped = true;
            tracing::warn!(
                received,
                max_upload_size = self.max_upload_size,
                "Upload exceeded size limit, draining remainder"
            );
            form.record_fault(self.size_fault(received));
        }
        true
    }

    fn size_fault(&self, bytes_seen: u64) -> AppError {
        AppError::SizeExceeded(format!(
            "{} bytes exceeds the configured maximum of {} bytes",
            bytes_seen, self.max_upload_size
        ))
    }
}

/// Delete every temp file referenced by the form, concurrently, and wait for
/// all deletions to finish. Failures are logged and never propagated;
/// descriptors without a path are skipped. Returns the number of deletions
/// attempted.
pub async fn cleanup_temp_files(form: &ReceivedForm) -> usize {
    let deletions = form
        .files
        .iter()
        .filter_map(|descriptor| descriptor.temp_path.as_deref())
        .map(|path| async move {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "Removed temporary upload file");
                }
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Failed to remove temporary upload file"
                    );
                }
            }
        })
        .collect::<Vec<_>>();

    let count = deletions.len();
    futures::future::join_all(deletions).await;
    count
}

/// Run temp-file cleanup, then produce the response exactly once.
///
/// Cleanup always runs before the outcome is turned into a response, so a
/// deletion failure can never mask the error being reported. The completion
/// flag is consulted after cleanup: only the first caller gets the response,
/// later invocations return `None`.
pub async fn cleanup_and_respond<T: IntoResponse>(
    outcome: Result<T, AppError>,
    form: &ReceivedForm,
    completion: &Completion,
) -> Option<Response> {
    cleanup_temp_files(form).await;

    if !completion.try_complete() {
        return None;
    }

    Some(match outcome {
        Ok(body) => body.into_response(),
        Err(err) => HttpAppError::from(err).into_response(),
    })
}

/// Create a temp spool file for an incoming file field. The file is kept on
/// disk (not self-deleting) because cleanup owns deletion explicitly.
fn spool_target() -> Result<(tokio::fs::File, PathBuf), AppError> {
    let temp = tempfile::Builder::new()
        .prefix("embedia-upload-")
        .tempfile()
        .map_err(AppError::from)?;
    let (file, path) = temp
        .keep()
        .map_err(|err| AppError::Internal(format!("Failed to keep temp spool file: {}", err)))?;
    Ok((tokio::fs::File::from_std(file), path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request, StatusCode};
    use embedia_storage::LocalStorage;
    use std::convert::Infallible;
    use tempfile::tempdir;

    const BOUNDARY: &str = "EMBEDIA-TEST-BOUNDARY";

    struct TestLimits(u64);

    impl UploadLimits for TestLimits {
        fn max_upload_size_bytes(&self) -> u64 {
            self.0
        }
    }

    fn file_part(field_name: &str, filename: &str, data: &[u8]) -> Vec<u8> {
        let mut part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(data);
        part.extend_from_slice(b"\r\n");
        part
    }

    fn text_part(field_name: &str, value: &str) -> Vec<u8> {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"\r\n\r\n{value}\r\n"
        )
        .into_bytes()
    }

    fn closing() -> Vec<u8> {
        format!("--{BOUNDARY}--\r\n").into_bytes()
    }

    async fn multipart_from_chunks(chunks: Vec<Vec<u8>>) -> Multipart {
        let stream =
            futures::stream::iter(chunks.into_iter().map(Ok::<_, Infallible>));
        let request = Request::builder()
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from_stream(stream))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    async fn storage_in(dir: &std::path::Path) -> Arc<dyn Storage> {
        Arc::new(
            LocalStorage::new(dir, "http://localhost:4000/media".to_string())
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_receive_form_spools_files_in_field_order() {
        let dir = tempdir().unwrap();
        let service = UploadService::new(storage_in(dir.path()).await, &TestLimits(1024));

        let body = [
            text_part("caption", "holiday"),
            file_part("media", "first.png", b"first bytes"),
            file_part("thumb", "second.jpg", b"second bytes"),
            closing(),
        ]
        .concat();
        let mut multipart = multipart_from_chunks(vec![body]).await;

        let form = service.receive_form(None, &mut multipart).await;

        assert!(form.fault.is_none());
        assert_eq!(form.files.len(), 2);
        assert_eq!(form.first_file().unwrap().original_filename, "first.png");
        assert_eq!(form.first_file().unwrap().bytes_received, 11);

        for descriptor in &form.files {
            assert!(descriptor.temp_path.as_ref().unwrap().exists());
        }

        // One deletion per temp file, all awaited.
        assert_eq!(cleanup_temp_files(&form).await, 2);
        for descriptor in &form.files {
            assert!(!descriptor.temp_path.as_ref().unwrap().exists());
        }
    }

    #[tokio::test]
    async fn test_store_first_file_hands_off_to_storage() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        let service = UploadService::new(storage.clone(), &TestLimits(1024));

        let body = [
            file_part("media", "photo.png", b"payload"),
            file_part("extra", "other.txt", b"ignored"),
            closing(),
        ]
        .concat();
        let mut multipart = multipart_from_chunks(vec![body]).await;

        let form = service.receive_form(None, &mut multipart).await;
        let stored = service.store_first_file(&form).await.unwrap();

        assert!(stored.storage_key.ends_with(".png"));
        assert_eq!(storage.download(&stored.storage_key).await.unwrap(), b"payload");

        cleanup_temp_files(&form).await;
    }

    #[tokio::test]
    async fn test_cumulative_limit_trips_mid_stream() {
        let dir = tempdir().unwrap();
        let service = UploadService::new(storage_in(dir.path()).await, &TestLimits(16));

        // First file's data split across transport chunks so the limit (16)
        // is crossed mid-stream, with a second file field arriving after the
        // abort while the stream keeps delivering.
        let header = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"media\"; filename=\"big.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        let chunks = vec![
            [header, vec![b'a'; 10]].concat(),
            vec![b'a'; 10],
            [
                b"\r\n".to_vec(),
                file_part("extra", "late.bin", &[b'b'; 4]),
                closing(),
            ]
            .concat(),
        ];

        let mut multipart = multipart_from_chunks(chunks).await;
        let form = service.receive_form(None, &mut multipart).await;

        match form.fault {
            Some(AppError::SizeExceeded(_)) => {}
            ref other => panic!("expected a size fault, got {:?}", other),
        }

        // Both fields got descriptors; the late one was never spooled.
        assert_eq!(form.files.len(), 2);
        assert!(form.files[0].temp_path.is_some());
        assert!(form.files[1].temp_path.is_none());

        let spool = form.files[0].temp_path.clone().unwrap();
        assert!(spool.exists());
        assert_eq!(cleanup_temp_files(&form).await, 1);
        assert!(!spool.exists());
    }

    #[tokio::test]
    async fn test_declared_total_over_limit_spools_nothing() {
        let dir = tempdir().unwrap();
        let service = UploadService::new(storage_in(dir.path()).await, &TestLimits(16));

        let body = [file_part("media", "big.bin", &[b'a'; 8]), closing()].concat();
        let mut multipart = multipart_from_chunks(vec![body]).await;

        let form = service.receive_form(Some(1_000_000), &mut multipart).await;

        match form.fault {
            Some(AppError::SizeExceeded(_)) => {}
            ref other => panic!("expected a size fault, got {:?}", other),
        }
        assert!(form.files.iter().all(|d| d.temp_path.is_none()));
        assert_eq!(cleanup_temp_files(&form).await, 0);
    }

    #[tokio::test]
    async fn test_no_file_fields_yields_no_files_submitted() {
        let dir = tempdir().unwrap();
        let service = UploadService::new(storage_in(dir.path()).await, &TestLimits(1024));

        let body = [text_part("caption", "no file"), closing()].concat();
        let mut multipart = multipart_from_chunks(vec![body]).await;

        let form = service.receive_form(None, &mut multipart).await;
        assert!(form.fault.is_none());
        assert!(form.files.is_empty());
        assert_eq!(cleanup_temp_files(&form).await, 0);

        match service.store_first_file(&form).await {
            Err(AppError::NoFilesSubmitted) => {}
            other => panic!("expected NoFilesSubmitted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cleanup_and_respond_is_one_shot() {
        let mut form = ReceivedForm::default();
        let (_, path) = tempfile::Builder::new()
            .prefix("embedia-upload-")
            .tempfile()
            .unwrap()
            .keep()
            .unwrap();
        let mut descriptor = FileDescriptor::new("media".into(), "a.png".into());
        descriptor.temp_path = Some(path.clone());
        form.files.push(descriptor);

        let completion = Completion::default();

        let first = cleanup_and_respond(Ok::<_, AppError>(StatusCode::OK), &form, &completion).await;
        assert_eq!(first.unwrap().status(), StatusCode::OK);
        assert!(!path.exists());

        // Re-entry after `Responded` cleans up again (a no-op here) but never
        // produces a second response.
        let second =
            cleanup_and_respond(Ok::<_, AppError>(StatusCode::OK), &form, &completion).await;
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_and_respond_maps_size_fault_to_413() {
        let form = ReceivedForm::default();
        let completion = Completion::default();

        let response = cleanup_and_respond(
            Err::<StatusCode, _>(AppError::SizeExceeded("too big".to_string())),
            &form,
            &completion,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
