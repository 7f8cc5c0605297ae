//! Streaming multipart receive, size enforcement, and temp-file lifecycle.
//!
//! One request moves through `Parsing -> outcome -> Cleanup -> Responded`:
//! `receive_form` does the streaming parse and spooling, the handler picks
//! the outcome, and `cleanup_and_respond` deletes every spool file before a
//! response leaves. The `Completion` flag makes `Responded` terminal.

mod service;
mod types;

pub use service::{cleanup_and_respond, cleanup_temp_files, UploadLimits, UploadService};
pub use types::{Completion, FileDescriptor, ReceivedForm};
