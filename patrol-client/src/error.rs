//! Error types for the Ping Patrol client

use patrol_core::dto::test::ErrorBody;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Ping Patrol client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
        /// Failure category reported by the server, e.g. `timed_out`
        category: Option<String>,
        /// Identity of the failed run
        run_id: Option<String>,
        /// Probe agent logs attached to the failure
        logs: Option<String>,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
            category: None,
            run_id: None,
            logs: None,
        }
    }

    /// Create an API error from a raw error response body
    ///
    /// Structured bodies contribute their message, category, run id and logs;
    /// anything else is kept verbatim as the message.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(body) => Self::ApiError {
                status,
                message: body.error,
                category: body.category,
                run_id: body.run_id,
                logs: body.logs,
            },
            Err(_) => Self::api_error(status, body),
        }
    }

    /// Failure category reported by the server
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::ApiError { category, .. } => category.as_deref(),
            _ => None,
        }
    }

    /// Probe agent logs attached to the failure
    pub fn logs(&self) -> Option<&str> {
        match self {
            Self::ApiError { logs, .. } => logs.as_deref(),
            _ => None,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_body() {
        let body = r#"{"error":"Job ping-patrol-tester-job-ab12cd34 failed: BackoffLimitExceeded","category":"job_failed","run_id":"ab12cd34","logs":"boom"}"#;
        let err = ClientError::from_body(502, body);

        assert!(err.is_server_error());
        assert_eq!(err.category(), Some("job_failed"));
        assert_eq!(err.logs(), Some("boom"));
        match err {
            ClientError::ApiError {
                message, run_id, ..
            } => {
                assert!(message.ends_with("BackoffLimitExceeded"));
                assert_eq!(run_id.as_deref(), Some("ab12cd34"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_plain_body() {
        let err = ClientError::from_body(415, "Unsupported Media Type");
        assert!(err.is_client_error());
        assert!(err.category().is_none());
        assert_eq!(
            err.to_string(),
            "API error (status 415): Unsupported Media Type"
        );
    }

    #[test]
    fn test_validation_body() {
        let err = ClientError::from_body(
            400,
            r#"{"error":"destinations must not be empty","category":"validation"}"#,
        );
        assert!(err.is_client_error());
        assert_eq!(err.category(), Some("validation"));
        assert!(err.logs().is_none());
    }
}
