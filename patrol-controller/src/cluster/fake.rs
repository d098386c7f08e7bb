//! In-memory cluster used to drive the run controller in tests

use async_trait::async_trait;
use patrol_core::domain::job::JobStatusSnapshot;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::Instant;

use super::{ClusterJobClient, JobRef, PodRef, ResourceRef, StatusPoll};
use crate::error::{Result, RunError};

/// Scripted control plane
///
/// Status polls pop from a queue; once it is empty every poll reports a
/// pending job.
pub struct FakeCluster {
    statuses: Mutex<VecDeque<StatusPoll>>,
    pod_count: usize,
    logs: std::result::Result<String, String>,
    submit_error: Option<String>,
    panic_on_status: bool,

    pub submits: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub pod_lookups: AtomicUsize,
    pub log_fetches: AtomicUsize,
    pub deletes: Mutex<Vec<ResourceRef>>,
    pub poll_times: Mutex<Vec<Instant>>,
    pub submitted_manifests: Mutex<Vec<String>>,
    pub log_containers: Mutex<Vec<Option<String>>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            pod_count: 1,
            logs: Ok("[]".to_string()),
            submit_error: None,
            panic_on_status: false,
            submits: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            pod_lookups: AtomicUsize::new(0),
            log_fetches: AtomicUsize::new(0),
            deletes: Mutex::new(Vec::new()),
            poll_times: Mutex::new(Vec::new()),
            submitted_manifests: Mutex::new(Vec::new()),
            log_containers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_statuses(mut self, statuses: Vec<StatusPoll>) -> Self {
        self.statuses = Mutex::new(statuses.into());
        self
    }

    pub fn with_pods(mut self, count: usize) -> Self {
        self.pod_count = count;
        self
    }

    pub fn with_logs(mut self, logs: &str) -> Self {
        self.logs = Ok(logs.to_string());
        self
    }

    pub fn with_log_error(mut self, message: &str) -> Self {
        self.logs = Err(message.to_string());
        self
    }

    pub fn failing_submit(mut self, stderr: &str) -> Self {
        self.submit_error = Some(stderr.to_string());
        self
    }

    pub fn panicking_status(mut self) -> Self {
        self.panic_on_status = true;
        self
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Snapshot helper
pub fn snapshot(succeeded: u32, failed: u32) -> StatusPoll {
    StatusPoll::Snapshot(JobStatusSnapshot {
        succeeded,
        failed,
        ..Default::default()
    })
}

/// A job that has not finished yet
pub fn pending() -> StatusPoll {
    snapshot(0, 0)
}

#[async_trait]
impl ClusterJobClient for FakeCluster {
    async fn submit(&self, manifest: &Path) -> Result<()> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        let contents = std::fs::read_to_string(manifest).unwrap_or_default();
        self.submitted_manifests.lock().unwrap().push(contents);

        match &self.submit_error {
            Some(stderr) => Err(RunError::Submit {
                exit_code: 1,
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn job_status(&self, _job: &JobRef) -> StatusPoll {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.poll_times.lock().unwrap().push(Instant::now());

        if self.panic_on_status {
            panic!("control plane exploded");
        }

        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(pending)
    }

    async fn list_pods_for_job(&self, job: &JobRef) -> Result<Vec<PodRef>> {
        self.pod_lookups.fetch_add(1, Ordering::SeqCst);

        if self.pod_count == 0 {
            return Err(RunError::Lookup(format!("no pods found for job {}", job.name)));
        }

        Ok((0..self.pod_count)
            .map(|i| PodRef {
                name: format!("{}-pod{}", job.name, i),
                namespace: job.namespace.clone(),
                phase: None,
            })
            .collect())
    }

    async fn fetch_logs(&self, pod: &PodRef, container: Option<&str>) -> Result<String> {
        self.log_fetches.fetch_add(1, Ordering::SeqCst);
        self.log_containers
            .lock()
            .unwrap()
            .push(container.map(str::to_string));

        self.logs.clone().map_err(|message| RunError::LogFetch {
            pod: pod.name.clone(),
            message,
        })
    }

    async fn delete(&self, resource: &ResourceRef) {
        self.deletes.lock().unwrap().push(resource.clone());
    }
}
