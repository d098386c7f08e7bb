//! Job status types
//!
//! A [`JobStatusSnapshot`] is the point-in-time `status` block of a cluster
//! Job object as reported by the control plane.

use serde::{Deserialize, Serialize};

/// Point-in-time view of a submitted job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusSnapshot {
    #[serde(default)]
    pub active: u32,
    #[serde(default)]
    pub succeeded: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub conditions: Vec<JobCondition>,
}

/// A job condition such as `Complete` or `Failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCondition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What a snapshot says about the job's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobVerdict {
    Succeeded,
    Failed,
    Pending,
}

impl JobStatusSnapshot {
    /// Classifies the snapshot.
    ///
    /// A non-zero success count wins over a non-zero failure count: a retried
    /// pod can leave a stale failure behind a completed success.
    pub fn verdict(&self) -> JobVerdict {
        if self.succeeded > 0 {
            JobVerdict::Succeeded
        } else if self.failed > 0 {
            JobVerdict::Failed
        } else {
            JobVerdict::Pending
        }
    }

    /// Human-readable reason from the first active `Failed` condition, if any
    pub fn failure_reason(&self) -> Option<String> {
        self.conditions
            .iter()
            .find(|c| c.kind == "Failed" && c.status == "True")
            .map(|c| match (&c.reason, &c.message) {
                (Some(reason), Some(message)) => format!("{}: {}", reason, message),
                (Some(reason), None) => reason.clone(),
                (None, Some(message)) => message.clone(),
                (None, None) => "Failed".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(succeeded: u32, failed: u32) -> JobStatusSnapshot {
        JobStatusSnapshot {
            succeeded,
            failed,
            ..Default::default()
        }
    }

    #[test]
    fn test_verdict() {
        assert_eq!(snapshot(0, 0).verdict(), JobVerdict::Pending);
        assert_eq!(snapshot(1, 0).verdict(), JobVerdict::Succeeded);
        assert_eq!(snapshot(0, 1).verdict(), JobVerdict::Failed);
    }

    #[test]
    fn test_success_wins_tie() {
        assert_eq!(snapshot(1, 1).verdict(), JobVerdict::Succeeded);
    }

    #[test]
    fn test_parses_cluster_status_block() {
        let json = r#"{
            "failed": 1,
            "startTime": "2024-05-01T10:00:00Z",
            "conditions": [
                {"type": "Failed", "status": "True", "reason": "BackoffLimitExceeded",
                 "message": "Job has reached the specified backoff limit",
                 "lastProbeTime": "2024-05-01T10:01:00Z"}
            ]
        }"#;

        let status: JobStatusSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(status.verdict(), JobVerdict::Failed);
        assert_eq!(status.succeeded, 0);
        assert_eq!(
            status.failure_reason().as_deref(),
            Some("BackoffLimitExceeded: Job has reached the specified backoff limit")
        );
    }

    #[test]
    fn test_empty_status_block_is_pending() {
        let status: JobStatusSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(status.verdict(), JobVerdict::Pending);
        assert!(status.failure_reason().is_none());
    }
}
