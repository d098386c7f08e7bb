//! Cluster job client
//!
//! The control plane is reached through the [`ClusterJobClient`] trait so the
//! run controller can be driven by an in-memory fake in tests. The production
//! implementation shells out to `kubectl`.

mod kubectl;

#[cfg(test)]
pub(crate) mod fake;

pub use kubectl::KubectlClient;

use async_trait::async_trait;
use patrol_core::domain::job::JobStatusSnapshot;
use patrol_core::domain::run::RunIdentity;
use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

/// A submitted probe job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRef {
    pub name: String,
    pub namespace: String,
    pub run_id: RunIdentity,
}

impl JobRef {
    pub fn as_resource(&self) -> ResourceRef {
        ResourceRef {
            kind: "job".to_string(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

/// A pod created for a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRef {
    pub name: String,
    pub namespace: String,
    /// Pod phase as last reported, e.g. `Succeeded` or `Failed`
    pub phase: Option<String>,
}

/// Any namespaced cluster resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

/// Reply to a status poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPoll {
    /// The job's current status block
    Snapshot(JobStatusSnapshot),
    /// Status was not available this time; the poll may be retried
    NotReady(String),
}

/// Control-plane operations the run controller depends on
#[async_trait]
pub trait ClusterJobClient: Send + Sync {
    /// Applies the manifest stored at `manifest`
    ///
    /// Fails with [`RunError::Submit`](crate::RunError::Submit) when the
    /// control plane rejects it.
    async fn submit(&self, manifest: &Path) -> Result<()>;

    /// Reads the job's status; retryable failures surface as [`StatusPoll::NotReady`]
    async fn job_status(&self, job: &JobRef) -> StatusPoll;

    /// Lists the pods labelled with the job's run identity
    ///
    /// Fails with [`RunError::Lookup`](crate::RunError::Lookup) when none exist.
    async fn list_pods_for_job(&self, job: &JobRef) -> Result<Vec<PodRef>>;

    /// Fetches a container's logs
    ///
    /// Without a container name the pod's only container is read.
    async fn fetch_logs(&self, pod: &PodRef, container: Option<&str>) -> Result<String>;

    /// Deletes a resource; best-effort, failures are logged and never returned
    async fn delete(&self, resource: &ResourceRef);
}

/// Subset of a Job object read by status polls
#[derive(Debug, Deserialize)]
struct JobObject {
    #[serde(default)]
    status: JobStatusSnapshot,
}

/// Subset of a pod list read by pod lookups
#[derive(Debug, Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<PodObject>,
}

#[derive(Debug, Deserialize)]
struct PodObject {
    metadata: PodMetadata,
    #[serde(default)]
    status: Option<PodStatus>,
}

#[derive(Debug, Deserialize)]
struct PodMetadata {
    name: String,
    #[serde(default)]
    namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PodStatus {
    #[serde(default)]
    phase: Option<String>,
}

/// Chooses the pod whose logs describe the observed outcome
///
/// Prefers a pod in `phase`, then falls back to the most recently listed pod.
pub fn select_pod<'a>(pods: &'a [PodRef], phase: &str) -> Option<&'a PodRef> {
    pods.iter()
        .rev()
        .find(|pod| pod.phase.as_deref() == Some(phase))
        .or_else(|| pods.last())
}
