//! kubectl-backed cluster client
//!
//! Every control-plane operation is one `kubectl` invocation:
//! - `apply -f` to submit a manifest
//! - `get job -o json` to poll status
//! - `get pods -l job-id=<run> -o json` to find the job's pods
//! - `logs` to read the agent's output
//! - `delete` for best-effort cleanup

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::{ClusterJobClient, JobObject, JobRef, PodList, PodRef, ResourceRef, StatusPoll};
use crate::error::{Result, RunError};
use crate::manifest::RUN_LABEL;

/// How a failed invocation is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// Failure is part of normal operation and will be retried
    Expected,
    /// Failure ends the operation
    Unexpected,
}

/// Captured result of one kubectl invocation
#[derive(Debug)]
struct Invocation {
    success: bool,
    exit_code: i32,
    stdout: String,
    stderr: String,
}

/// Cluster client that drives `kubectl`
#[derive(Debug, Clone)]
pub struct KubectlClient {
    binary: String,
}

impl KubectlClient {
    /// Creates a client invoking the given kubectl binary
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Runs kubectl with `args` and logs the outcome
    ///
    /// Non-zero exits are logged at ERROR (WARN when `failure` is expected);
    /// a non-zero exit with nothing on stderr is only logged at INFO.
    async fn invoke(&self, args: &[&str], failure: Failure) -> std::io::Result<Invocation> {
        debug!("Invoking {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                error!("Failed to execute {}: {}", self.binary, e);
                e
            })?;

        let invocation = Invocation {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !invocation.success {
            let stderr = invocation.stderr.trim();
            if stderr.is_empty() {
                info!(
                    "kubectl {} exited with code {} and no stderr",
                    args.first().copied().unwrap_or_default(),
                    invocation.exit_code
                );
            } else if failure == Failure::Expected {
                warn!(
                    "kubectl {} failed: exit_code={} stderr='{}'",
                    args.join(" "),
                    invocation.exit_code,
                    stderr
                );
            } else {
                error!(
                    "kubectl {} failed: exit_code={} stderr='{}'",
                    args.join(" "),
                    invocation.exit_code,
                    stderr
                );
            }
        }

        Ok(invocation)
    }
}

impl Default for KubectlClient {
    fn default() -> Self {
        Self::new("kubectl")
    }
}

#[async_trait]
impl ClusterJobClient for KubectlClient {
    async fn submit(&self, manifest: &Path) -> Result<()> {
        let path = manifest.to_string_lossy().to_string();
        let invocation = self
            .invoke(&["apply", "-f", path.as_str()], Failure::Unexpected)
            .await
            .map_err(|e| RunError::Submit {
                exit_code: -1,
                stderr: e.to_string(),
            })?;

        if !invocation.success {
            return Err(RunError::Submit {
                exit_code: invocation.exit_code,
                stderr: invocation.stderr.trim().to_string(),
            });
        }

        info!("Applied manifest {}: {}", path, invocation.stdout.trim());
        Ok(())
    }

    async fn job_status(&self, job: &JobRef) -> StatusPoll {
        let invocation = match self
            .invoke(
                &[
                    "get",
                    "job",
                    job.name.as_str(),
                    "-n",
                    job.namespace.as_str(),
                    "-o",
                    "json",
                ],
                Failure::Expected,
            )
            .await
        {
            Ok(invocation) => invocation,
            Err(e) => return StatusPoll::NotReady(format!("failed to execute kubectl: {}", e)),
        };

        if !invocation.success {
            return StatusPoll::NotReady(format!(
                "kubectl get job exited with code {}: {}",
                invocation.exit_code,
                invocation.stderr.trim()
            ));
        }

        match serde_json::from_str::<JobObject>(&invocation.stdout) {
            Ok(object) => {
                debug!(
                    "Job {} status: active={} succeeded={} failed={}",
                    job.name, object.status.active, object.status.succeeded, object.status.failed
                );
                StatusPoll::Snapshot(object.status)
            }
            Err(e) => {
                warn!("Unreadable status for job {}: {}", job.name, e);
                StatusPoll::NotReady(format!("unreadable job status: {}", e))
            }
        }
    }

    async fn list_pods_for_job(&self, job: &JobRef) -> Result<Vec<PodRef>> {
        let selector = format!("{}={}", RUN_LABEL, job.run_id);
        let invocation = self
            .invoke(
                &[
                    "get",
                    "pods",
                    "-n",
                    job.namespace.as_str(),
                    "-l",
                    selector.as_str(),
                    "-o",
                    "json",
                ],
                Failure::Unexpected,
            )
            .await
            .map_err(|e| RunError::Lookup(format!("failed to execute kubectl: {}", e)))?;

        if !invocation.success {
            return Err(RunError::Lookup(format!(
                "kubectl get pods exited with code {}: {}",
                invocation.exit_code,
                invocation.stderr.trim()
            )));
        }

        let list: PodList = serde_json::from_str(&invocation.stdout)
            .map_err(|e| RunError::Lookup(format!("unreadable pod list: {}", e)))?;

        let pods: Vec<PodRef> = list
            .items
            .into_iter()
            .map(|pod| PodRef {
                namespace: pod
                    .metadata
                    .namespace
                    .unwrap_or_else(|| job.namespace.clone()),
                name: pod.metadata.name,
                phase: pod.status.and_then(|s| s.phase),
            })
            .collect();

        if pods.is_empty() {
            return Err(RunError::Lookup(format!(
                "no pods found for job {} (selector {})",
                job.name, selector
            )));
        }

        debug!("Found {} pod(s) for job {}", pods.len(), job.name);
        Ok(pods)
    }

    async fn fetch_logs(&self, pod: &PodRef, container: Option<&str>) -> Result<String> {
        let mut args = vec!["logs", pod.name.as_str(), "-n", pod.namespace.as_str()];
        if let Some(container) = container {
            args.push("-c");
            args.push(container);
        }

        let invocation = self
            .invoke(&args, Failure::Unexpected)
            .await
            .map_err(|e| RunError::LogFetch {
                pod: pod.name.clone(),
                message: format!("failed to execute kubectl: {}", e),
            })?;

        if !invocation.success {
            return Err(RunError::LogFetch {
                pod: pod.name.clone(),
                message: format!(
                    "kubectl logs exited with code {}: {}",
                    invocation.exit_code,
                    invocation.stderr.trim()
                ),
            });
        }

        debug!(
            "Fetched {} bytes of logs from pod {}",
            invocation.stdout.len(),
            pod.name
        );
        Ok(invocation.stdout)
    }

    async fn delete(&self, resource: &ResourceRef) {
        let result = self
            .invoke(
                &[
                    "delete",
                    resource.kind.as_str(),
                    resource.name.as_str(),
                    "-n",
                    resource.namespace.as_str(),
                    "--ignore-not-found",
                    "--wait=false",
                    "--cascade=background",
                ],
                Failure::Unexpected,
            )
            .await;

        match result {
            Ok(invocation) if invocation.success => {
                info!("Deleted {} {}", resource.kind, resource.name);
            }
            Ok(invocation) => {
                warn!(
                    "Failed to delete {} {}: {}",
                    resource.kind,
                    resource.name,
                    invocation.stderr.trim()
                );
            }
            Err(e) => {
                warn!("Failed to delete {} {}: {}", resource.kind, resource.name, e);
            }
        }
    }
}
