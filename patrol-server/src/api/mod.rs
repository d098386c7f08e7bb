//! API Module
//!
//! HTTP API layer for the connectivity tester.
//! Each submodule handles the endpoints of one concern.

pub mod connectivity;
pub mod destinations;
pub mod error;
pub mod health;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use patrol_controller::RunController;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RunController>,
    pub destinations_file: PathBuf,
}

impl AppState {
    pub fn new(controller: Arc<RunController>, destinations_file: PathBuf) -> Self {
        Self {
            controller,
            destinations_file,
        }
    }
}

/// Builds the CORS policy: a single allowed origin, or any origin when unset
pub fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };

    let origin: HeaderValue = origin
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalog
        .route("/api/destinations", get(destinations::list_destinations))
        // Connectivity runs
        .route("/api/test", post(connectivity::run_test))
        // Add state and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
