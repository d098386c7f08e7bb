//! Run controller
//!
//! Drives one connectivity run from request to result:
//! - Renders the job manifest and writes it to a local artifact
//! - Submits the job and polls its status at a fixed interval
//! - Reads the agent's logs once the job succeeds (or, best-effort, fails)
//! - Removes the artifact, and optionally the job, on every exit path

use chrono::{DateTime, Utc};
use patrol_core::domain::probe::ProbeResult;
use patrol_core::domain::request::TestRequest;
use patrol_core::domain::run::{RunIdentity, RunState};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::artifact::ManifestArtifact;
use crate::cluster::{ClusterJobClient, JobRef, StatusPoll, select_pod};
use crate::config::ControllerConfig;
use crate::error::{Result, RunError};
use crate::extract::extract;
use crate::manifest::{JobManifest, Placement, TemplateError, Templater, job_name, load_template};
use crate::state::RunMachine;

/// Everything known about a finished run
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunIdentity,
    pub job_name: String,
    /// Terminal classification of the run
    pub state: RunState,
    /// Status polls performed
    pub polls: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: Result<Vec<ProbeResult>>,
}

impl RunReport {
    pub fn into_outcome(self) -> Result<Vec<ProbeResult>> {
        self.outcome
    }
}

/// Orchestrates connectivity runs against a cluster
///
/// Runs are independent: each gets its own identity, artifact and job, so a
/// single controller can serve concurrent requests.
pub struct RunController {
    config: ControllerConfig,
    templater: Templater,
    cluster: Arc<dyn ClusterJobClient>,
}

impl RunController {
    /// Creates a controller from an already loaded base manifest
    pub fn new(
        config: ControllerConfig,
        base_manifest: JsonValue,
        cluster: Arc<dyn ClusterJobClient>,
    ) -> Self {
        let placement = Placement {
            namespace: config.namespace.clone(),
            image: config.image.clone(),
        };
        Self {
            templater: Templater::new(base_manifest, placement),
            config,
            cluster,
        }
    }

    /// Creates a controller, loading the base manifest from `config.template_path`
    pub fn from_config(
        config: ControllerConfig,
        cluster: Arc<dyn ClusterJobClient>,
    ) -> std::result::Result<Self, TemplateError> {
        let base_manifest = load_template(&config.template_path)?;
        Ok(Self::new(config, base_manifest, cluster))
    }

    /// Runs a test and returns only its outcome
    pub async fn execute(&self, request: &TestRequest) -> Result<Vec<ProbeResult>> {
        self.run(request).await.into_outcome()
    }

    /// Runs a test to completion
    pub async fn run(&self, request: &TestRequest) -> RunReport {
        self.run_with_cancel(request, CancellationToken::new()).await
    }

    /// Runs a test, giving up early when `cancel` fires
    ///
    /// The token is checked before every control-plane call and raced against
    /// every poll delay. Cleanup runs regardless.
    pub async fn run_with_cancel(
        &self,
        request: &TestRequest,
        cancel: CancellationToken,
    ) -> RunReport {
        let run_id = RunIdentity::generate();
        let job = JobRef {
            name: job_name(&run_id),
            namespace: self.config.namespace.clone(),
            run_id: run_id.clone(),
        };
        let started_at = Utc::now();
        let mut machine = RunMachine::new(self.config.max_attempts);

        info!(
            run_id = %run_id,
            "Starting connectivity run for {} destination(s) as job {}",
            request.len(),
            job.name
        );

        let outcome = self.run_job(&job, request, &mut machine, &cancel).await;

        let state = match &outcome {
            Ok(_) => RunState::Succeeded,
            Err(e) => e.terminal_state(),
        };

        match &outcome {
            Ok(results) => {
                let passed = results.iter().filter(|r| r.is_success()).count();
                info!(
                    run_id = %run_id,
                    "Run finished: {}/{} destination(s) reachable",
                    passed,
                    results.len()
                );
            }
            Err(e) => {
                error!(
                    run_id = %run_id,
                    category = e.category(),
                    "Run finished in state {}: {}",
                    state,
                    e
                );
            }
        }

        RunReport {
            run_id,
            job_name: job.name,
            state,
            polls: machine.polls(),
            started_at,
            finished_at: Utc::now(),
            outcome,
        }
    }

    /// Renders, submits and tracks the job, then cleans up
    async fn run_job(
        &self,
        job: &JobRef,
        request: &TestRequest,
        machine: &mut RunMachine,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProbeResult>> {
        let manifest = self.templater.render(&job.run_id, request.destinations())?;
        debug!(
            "Rendered manifest for job {} with args {:?}",
            manifest.name(),
            manifest.container_args()
        );
        let mut artifact = ManifestArtifact::create(&self.config.artifact_dir, &manifest).await?;

        let outcome = self
            .orchestrate(job, &manifest, artifact.path(), machine, cancel)
            .await;

        artifact.release().await;
        if !self.config.retain_completed_jobs && machine.was_submitted() {
            self.cluster.delete(&job.as_resource()).await;
        }

        outcome
    }

    async fn orchestrate(
        &self,
        job: &JobRef,
        manifest: &JobManifest,
        artifact: &Path,
        machine: &mut RunMachine,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProbeResult>> {
        ensure_active(cancel)?;
        if let Err(e) = self.cluster.submit(artifact).await {
            machine.submit_failed();
            return Err(e);
        }
        machine.submitted();
        info!(run_id = %job.run_id, "Submitted job {}", job.name);

        loop {
            ensure_active(cancel)?;
            let poll = self.cluster.job_status(job).await;
            if let StatusPoll::NotReady(reason) = &poll {
                debug!("Status of job {} not available: {}", job.name, reason);
            }

            match machine.observe(&poll) {
                RunState::Succeeded => {
                    info!(run_id = %job.run_id, "Job {} succeeded", job.name);
                    return self.collect_results(job, manifest, cancel).await;
                }
                RunState::Failed => {
                    let reason = match &poll {
                        StatusPoll::Snapshot(snapshot) => snapshot.failure_reason(),
                        StatusPoll::NotReady(_) => None,
                    };
                    warn!(run_id = %job.run_id, "Job {} failed", job.name);
                    return Err(self.job_failure(job, manifest, reason, cancel).await);
                }
                RunState::TimedOut => {
                    return Err(RunError::TimedOut {
                        job_name: job.name.clone(),
                        attempts: machine.polls(),
                    });
                }
                _ => {
                    debug!(
                        "Job {} still running (poll {}/{})",
                        job.name,
                        machine.polls(),
                        self.config.max_attempts
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(RunError::Cancelled),
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
            }
        }
    }

    /// Reads the succeeded job's logs once and parses them
    async fn collect_results(
        &self,
        job: &JobRef,
        manifest: &JobManifest,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProbeResult>> {
        let logs = self
            .fetch_agent_logs(job, manifest, "Succeeded", cancel)
            .await?;
        extract(&logs)
    }

    /// Builds the failure error, attaching the agent's logs when they can be read
    async fn job_failure(
        &self,
        job: &JobRef,
        manifest: &JobManifest,
        reason: Option<String>,
        cancel: &CancellationToken,
    ) -> RunError {
        match self.fetch_agent_logs(job, manifest, "Failed", cancel).await {
            Ok(logs) => RunError::JobFailed {
                job_name: job.name.clone(),
                reason,
                logs: Some(logs),
                log_error: None,
            },
            Err(e) => {
                warn!("Could not attach logs for failed job {}: {}", job.name, e);
                RunError::JobFailed {
                    job_name: job.name.clone(),
                    reason,
                    logs: None,
                    log_error: Some(Box::new(e)),
                }
            }
        }
    }

    async fn fetch_agent_logs(
        &self,
        job: &JobRef,
        manifest: &JobManifest,
        phase: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        ensure_active(cancel)?;
        let pods = self.cluster.list_pods_for_job(job).await?;
        let pod = select_pod(&pods, phase)
            .ok_or_else(|| RunError::Lookup(format!("no pods found for job {}", job.name)))?;

        ensure_active(cancel)?;
        self.cluster
            .fetch_logs(pod, manifest.container_name())
            .await
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(RunError::Cancelled);
    }
    Ok(())
}
