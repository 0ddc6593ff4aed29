//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    http::header::CACHE_CONTROL,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api;
use crate::models::AppConfig;
use crate::services::BackdropService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub backdrop: Arc<BackdropService>,
}

/// Create application state from configuration.
///
/// Starts the color worker, so it must run inside a tokio runtime.
pub fn create_app_state(config: Arc<AppConfig>) -> anyhow::Result<AppState> {
    let backdrop = Arc::new(
        BackdropService::new(config)
            .map_err(|e| anyhow::anyhow!("Failed to start backdrop service: {e}"))?,
    );
    Ok(AppState { backdrop })
}

/// Build the API router with all endpoints and middleware.
///
/// Colors are computed per upload, so responses are marked `no-store`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(api::handle_analyze))
        .route("/api/pick", post(api::handle_pick))
        .route("/api/presets", get(api::handle_presets))
        .route("/api/presets/selected", put(api::handle_select_preset))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state.backdrop)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            axum::http::HeaderValue::from_static("no-store"),
        ))
}
