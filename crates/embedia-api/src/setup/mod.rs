//! Application setup and initialization
//!
//! Initialization logic lives here rather than in main.rs so tests can build
//! the same router the binary serves.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use embedia_core::Config;
use embedia_storage::LocalStorage;

use crate::state::{AppState, MediaConfig};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();

    tracing::info!("Configuration loaded and validated successfully");

    let storage = LocalStorage::new(
        config.local_storage_path.clone(),
        config.local_storage_base_url.clone(),
    )
    .await
    .context("Failed to initialize local storage")?;

    let media = MediaConfig {
        storage: Arc::new(storage),
        max_upload_size_bytes: config.max_upload_size_bytes,
    };

    let state = Arc::new(AppState { config, media });
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
