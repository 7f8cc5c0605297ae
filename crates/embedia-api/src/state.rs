//! Application state.
//!
//! Collaborators (the storage service, configured limits) are injected
//! explicitly through this state; nothing in the request path reaches for
//! globals.

use std::sync::Arc;

use embedia_core::Config;
use embedia_storage::Storage;

use crate::services::upload::UploadLimits;

/// Media configuration and the storage collaborator used by upload handlers.
#[derive(Clone)]
pub struct MediaConfig {
    pub storage: Arc<dyn Storage>,
    pub max_upload_size_bytes: usize,
}

impl UploadLimits for MediaConfig {
    fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_bytes as u64
    }
}

pub struct AppState {
    pub config: Config,
    pub media: MediaConfig,
}
