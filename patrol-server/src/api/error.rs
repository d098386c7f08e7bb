//! API Error Handling
//!
//! Maps request and run failures to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use patrol_controller::RunError;
use patrol_core::domain::request::ValidationError;
use patrol_core::dto::test::ErrorBody;

use crate::catalog::CatalogError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body or rejected destinations
    BadRequest(String),
    /// A connectivity run ended in failure
    Run { run_id: String, error: RunError },
    Catalog(CatalogError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Run { error, .. } => run_status(error),
            ApiError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// HTTP status for a failed run
pub fn run_status(error: &RunError) -> StatusCode {
    match error {
        RunError::Validation(_) => StatusCode::BAD_REQUEST,
        RunError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        RunError::JobFailed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(msg) => ErrorBody {
                category: Some("validation".to_string()),
                ..ErrorBody::new(msg)
            },
            ApiError::Run { run_id, error } => {
                tracing::error!(run_id = %run_id, "Connectivity run failed: {}", error);
                ErrorBody {
                    category: Some(error.category().to_string()),
                    run_id: Some(run_id),
                    logs: error.logs().map(str::to_string),
                    ..ErrorBody::new(error.to_string())
                }
            }
            ApiError::Catalog(CatalogError::NotFound(path)) => {
                tracing::error!("Destinations file not found: {}", path.display());
                ErrorBody::new("Destinations file not found on server.")
            }
            ApiError::Catalog(err) => {
                tracing::error!("Error reading or parsing destinations file: {}", err);
                ErrorBody::new("An error occurred while processing destinations on the server.")
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_by_category() {
        let timed_out = RunError::TimedOut {
            job_name: "ping-patrol-tester-job-abc12345".to_string(),
            attempts: 24,
        };
        assert_eq!(run_status(&timed_out), StatusCode::GATEWAY_TIMEOUT);

        let failed = RunError::JobFailed {
            job_name: "ping-patrol-tester-job-abc12345".to_string(),
            reason: None,
            logs: None,
            log_error: None,
        };
        assert_eq!(run_status(&failed), StatusCode::BAD_GATEWAY);

        let submit = RunError::Submit {
            exit_code: 1,
            stderr: "forbidden".to_string(),
        };
        assert_eq!(run_status(&submit), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            run_status(&RunError::Validation(ValidationError::Empty)),
            StatusCode::BAD_REQUEST
        );
    }
}
