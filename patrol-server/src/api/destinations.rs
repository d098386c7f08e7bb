//! Destinations API Handler
//!
//! Serves the catalog of pre-selected destinations.

use axum::{Json, extract::State};
use patrol_core::domain::destination::Destination;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::catalog;

/// GET /api/destinations
/// List the pre-selected destinations
pub async fn list_destinations(State(state): State<AppState>) -> ApiResult<Json<Vec<Destination>>> {
    tracing::debug!(
        "Loading destinations from {}",
        state.destinations_file.display()
    );

    let destinations = catalog::load(&state.destinations_file).await?;
    Ok(Json(destinations))
}
