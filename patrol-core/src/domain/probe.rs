//! Probe result types
//!
//! Mirrors the JSON the probe agent writes to its log stream.

use serde::{Deserialize, Serialize};

/// Outcome of a single destination check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Result of probing one destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub destination: String,
    pub status: ProbeStatus,
    pub details: String,
    /// Wall-clock time the agent spent on the check, e.g. "12ms"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        self.status == ProbeStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_agent_output() {
        let json = r#"{"destination":"a.com:443","status":"FAILED","details":"refused","duration":"3ms"}"#;
        let result: ProbeResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.destination, "a.com:443");
        assert_eq!(result.status, ProbeStatus::Failed);
        assert_eq!(result.duration.as_deref(), Some("3ms"));
        assert!(!result.is_success());
    }

    #[test]
    fn test_duration_omitted_when_absent() {
        let result = ProbeResult {
            destination: "a.com".to_string(),
            status: ProbeStatus::Success,
            details: "ok".to_string(),
            duration: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"destination": "a.com", "status": "SUCCESS", "details": "ok"})
        );
    }

    #[test]
    fn test_rejects_unknown_status() {
        let json = r#"{"destination":"a.com","status":"MAYBE","details":""}"#;
        assert!(serde_json::from_str::<ProbeResult>(json).is_err());
    }
}
