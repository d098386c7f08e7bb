//! Error types for connectivity runs

use patrol_core::domain::request::ValidationError;
use patrol_core::domain::run::RunState;
use std::path::PathBuf;
use thiserror::Error;

use crate::manifest::TemplateError;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, RunError>;

/// Errors that end a connectivity run
#[derive(Debug, Error)]
pub enum RunError {
    /// The inbound request was rejected
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The base job manifest cannot be specialized
    #[error("Job template error: {0}")]
    Template(#[from] TemplateError),

    /// The manifest artifact could not be written
    #[error("Failed to write manifest artifact {}: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The control plane rejected the manifest
    #[error("Failed to submit job (exit code {exit_code}): {stderr}")]
    Submit { exit_code: i32, stderr: String },

    /// The job's pods could not be found
    #[error("Pod lookup failed: {0}")]
    Lookup(String),

    /// Container logs could not be retrieved
    #[error("Failed to fetch logs from pod {pod}: {message}")]
    LogFetch { pod: String, message: String },

    /// The agent output is not a probe result array
    #[error("Failed to parse probe results: {message}")]
    ResultParse { message: String, logs: String },

    /// The probe agent reported failure
    #[error("Job {job_name} failed: {}", .reason.as_deref().unwrap_or("probe agent reported failure"))]
    JobFailed {
        job_name: String,
        reason: Option<String>,
        logs: Option<String>,
        /// Why the logs could not be attached
        #[source]
        log_error: Option<Box<RunError>>,
    },

    /// No terminal status within the polling budget
    #[error("Job {job_name} did not finish after {attempts} status checks")]
    TimedOut { job_name: String, attempts: u32 },

    /// The caller cancelled the run
    #[error("Run cancelled")]
    Cancelled,
}

impl RunError {
    /// Stable category name reported to callers
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Template(_) => "template",
            Self::Artifact { .. } => "artifact",
            Self::Submit { .. } => "submit",
            Self::Lookup(_) => "lookup",
            Self::LogFetch { .. } => "log_fetch",
            Self::ResultParse { .. } => "result_parse",
            Self::JobFailed { .. } => "job_failed",
            Self::TimedOut { .. } => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }

    /// Raw agent logs attached to the error, if any
    pub fn logs(&self) -> Option<&str> {
        match self {
            Self::JobFailed { logs, .. } => logs.as_deref(),
            Self::ResultParse { logs, .. } => Some(logs.as_str()),
            _ => None,
        }
    }

    /// The terminal state a run ending with this error is classified as
    pub fn terminal_state(&self) -> RunState {
        match self {
            Self::TimedOut { .. } => RunState::TimedOut,
            _ => RunState::Failed,
        }
    }
}
