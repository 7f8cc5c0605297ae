//! Request-scoped upload types.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use embedia_core::AppError;

/// Descriptor for one spooled multipart file field. The temp path is owned
/// exclusively by the request's cleanup step.
#[derive(Debug)]
pub struct FileDescriptor {
    pub field_name: String,
    pub original_filename: String,
    /// Spool location; `None` when the field was never spooled (the size
    /// limit had already tripped, or spool creation failed). Cleanup skips
    /// descriptors without a path.
    pub temp_path: Option<PathBuf>,
    /// Bytes written to the spool so far; approximate while streaming.
    pub bytes_received: u64,
}

impl FileDescriptor {
    pub fn new(field_name: String, original_filename: String) -> Self {
        FileDescriptor {
            field_name,
            original_filename,
            temp_path: None,
            bytes_received: 0,
        }
    }
}

/// Everything received for one upload request: file descriptors in field
/// insertion order, plus the first fault hit while parsing.
#[derive(Debug, Default)]
pub struct ReceivedForm {
    pub files: Vec<FileDescriptor>,
    pub fault: Option<AppError>,
}

impl ReceivedForm {
    /// First file field in insertion order.
    pub fn first_file(&self) -> Option<&FileDescriptor> {
        self.files.first()
    }

    /// Record a fault. The first fault wins; later ones are dropped so late
    /// stream events never replace the error being reported.
    pub fn record_fault(&mut self, fault: AppError) {
        if self.fault.is_none() {
            self.fault = Some(fault);
        } else {
            tracing::debug!(dropped = %fault, "Keeping the first recorded fault");
        }
    }
}

/// One-shot completion flag for a request: the first `try_complete` wins and
/// every later call is a no-op, so at most one response is dispatched even
/// when the completion path is re-entered after a cancelled parse.
#[derive(Debug, Default)]
pub struct Completion {
    responded: AtomicBool,
}

impl Completion {
    /// Returns true exactly once.
    pub fn try_complete(&self) -> bool {
        !self.responded.swap(true, Ordering::SeqCst)
    }

    pub fn is_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }
}
