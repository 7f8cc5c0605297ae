//! Health check handler.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
}

/// Liveness probe plus a lightweight storage connectivity check.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Probe with a key that never exists; connectivity matters, not the result.
    let storage = match state
        .media
        .storage
        .exists("health-check-non-existent-key")
        .await
    {
        Ok(_) => "healthy".to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "Storage health check failed");
            format!("degraded: {}", err)
        }
    };

    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        storage,
    })
}
