//! Route configuration and setup

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use embedia_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

/// Slack on top of the configured upload limit for multipart framing. The
/// streaming handler's own limit stays authoritative; this outer cap only
/// bounds how much a faulted request can keep delivering.
const UPLOAD_BODY_SLACK: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state.config)?;
    let body_limit =
        RequestBodyLimitLayer::new(state.config.max_upload_size_bytes + UPLOAD_BODY_SLACK);

    let router = Router::new()
        .route("/api/v0/media", post(handlers::media_upload::upload_media))
        .layer(body_limit)
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
        .merge(RapiDoc::with_openapi("/api/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(router)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    if config.cors_origins.iter().any(|origin| origin == "*") {
        // validate() already rejected the wildcard for production
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid CORS origin")?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}
