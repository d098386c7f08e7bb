//! Connectivity Test API Handler
//!
//! Validates the request and hands it to the run controller. The run lasts
//! as long as the probe job does; dropping the request (client disconnect)
//! drops the run and its manifest artifact with it.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use patrol_core::domain::probe::ProbeResult;
use patrol_core::domain::request::TestRequest;
use serde_json::Value as JsonValue;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// POST /api/test
/// Run a connectivity test from inside the cluster
pub async fn run_test(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> ApiResult<Json<Vec<ProbeResult>>> {
    let Json(body) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let request = TestRequest::from_json(&body)?;

    tracing::info!(
        "Testing connectivity to {} destination(s): {}",
        request.len(),
        request.joined()
    );

    let report = state.controller.run(&request).await;
    let run_id = report.run_id.to_string();

    report
        .into_outcome()
        .map(Json)
        .map_err(|error| ApiError::Run { run_id, error })
}
