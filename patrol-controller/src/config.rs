//! Controller configuration
//!
//! Defines the parameters of a connectivity run: where jobs are placed,
//! which agent image they run, how the controller polls them and where
//! manifest artifacts are written.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_IMAGE: &str = "ping-patrol/tester-agent:latest";
const DEFAULT_TEMPLATE_PATH: &str = "templates/tester-job.yaml";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_MAX_ATTEMPTS: u32 = 24;

/// Run controller configuration
///
/// Passed explicitly to the controller so tests can run side by side with
/// distinct settings.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Namespace the probe jobs are created in
    pub namespace: String,

    /// Probe agent container image
    pub image: String,

    /// Location of the base job manifest (YAML or JSON)
    pub template_path: PathBuf,

    /// Directory manifest artifacts are written to before submission
    pub artifact_dir: PathBuf,

    /// Fixed delay between status polls
    pub poll_interval: Duration,

    /// Number of status polls before the run times out
    pub max_attempts: u32,

    /// Leave finished jobs in the cluster for inspection
    pub retain_completed_jobs: bool,

    /// kubectl binary used as the control-plane transport
    pub kubectl: String,
}

impl ControllerConfig {
    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - PATROL_NAMESPACE (default: default)
    /// - PATROL_IMAGE (default: ping-patrol/tester-agent:latest)
    /// - PATROL_TEMPLATE_PATH (default: templates/tester-job.yaml)
    /// - PATROL_ARTIFACT_DIR (default: system temp dir)
    /// - PATROL_POLL_INTERVAL (seconds, default: 5)
    /// - PATROL_MAX_ATTEMPTS (default: 24)
    /// - PATROL_RETAIN_COMPLETED_JOBS (true/false, default: true)
    /// - PATROL_KUBECTL (default: kubectl)
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Builds configuration from an arbitrary key lookup, falling back to
    /// defaults for missing or unparsable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let namespace = lookup("PATROL_NAMESPACE").unwrap_or(defaults.namespace);
        let image = lookup("PATROL_IMAGE").unwrap_or(defaults.image);

        let template_path = lookup("PATROL_TEMPLATE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.template_path);

        let artifact_dir = lookup("PATROL_ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.artifact_dir);

        let poll_interval = lookup("PATROL_POLL_INTERVAL")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);

        let max_attempts = lookup("PATROL_MAX_ATTEMPTS")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_attempts);

        let retain_completed_jobs = lookup("PATROL_RETAIN_COMPLETED_JOBS")
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(defaults.retain_completed_jobs);

        let kubectl = lookup("PATROL_KUBECTL").unwrap_or(defaults.kubectl);

        Self {
            namespace,
            image,
            template_path,
            artifact_dir,
            poll_interval,
            max_attempts,
            retain_completed_jobs,
            kubectl,
        }
    }

    /// Upper bound on how long a run waits for its job
    ///
    /// Saturates at `Duration::MAX`; `validate` rejects such budgets.
    pub fn polling_budget(&self) -> Duration {
        self.poll_interval.saturating_mul(self.max_attempts)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.namespace.is_empty() {
            anyhow::bail!("namespace cannot be empty");
        }

        if self.image.is_empty() {
            anyhow::bail!("image cannot be empty");
        }

        if self.kubectl.is_empty() {
            anyhow::bail!("kubectl path cannot be empty");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        if self.poll_interval.checked_mul(self.max_attempts).is_none() {
            anyhow::bail!(
                "poll_interval of {:?} over {} attempts exceeds the maximum polling budget",
                self.poll_interval,
                self.max_attempts
            );
        }

        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            artifact_dir: std::env::temp_dir().join("ping-patrol"),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retain_completed_jobs: true,
            kubectl: "kubectl".to_string(),
        }
    }
}
