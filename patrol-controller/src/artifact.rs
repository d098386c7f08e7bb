//! Manifest artifact
//!
//! The rendered manifest is written to local storage right before submission
//! and removed when the run ends. Removal happens through [`ManifestArtifact::release`]
//! on the normal path and through `Drop` on early returns, panics and
//! cancelled futures.

use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{Result, RunError};
use crate::manifest::JobManifest;

/// On-disk copy of a run's manifest, deleted exactly once
#[derive(Debug)]
pub struct ManifestArtifact {
    path: PathBuf,
    released: bool,
}

impl ManifestArtifact {
    /// Writes `manifest` as YAML to `<dir>/<job name>.yaml`
    ///
    /// The file must not already exist; job names are unique per run, so
    /// concurrent runs never share a file.
    pub async fn create(dir: &Path, manifest: &JobManifest) -> Result<Self> {
        let path = dir.join(format!("{}.yaml", manifest.name()));
        let artifact_error = |source: io::Error| RunError::Artifact {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(artifact_error)?;

        let yaml = manifest
            .to_yaml()
            .map_err(|e| artifact_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(artifact_error)?;

        // From here on the guard owns the file, so a failed write still removes it
        let artifact = Self {
            path: path.clone(),
            released: false,
        };

        file.write_all(yaml.as_bytes())
            .await
            .map_err(artifact_error)?;
        file.sync_all().await.map_err(artifact_error)?;

        debug!("Wrote manifest artifact {}", path.display());
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the file
    ///
    /// Returns `true` on the call that performed the deletion attempt; later
    /// calls, and the eventual drop, are no-ops. Failures are logged, never
    /// returned.
    pub async fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        let removed = tokio::fs::remove_file(&self.path).await;
        self.log_removal(removed);
        true
    }

    fn log_removal(&self, removed: io::Result<()>) {
        match removed {
            Ok(()) => debug!("Removed manifest artifact {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove manifest artifact {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for ManifestArtifact {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        // Drop cannot await; unlinking one file is cheap enough to do inline
        let removed = std::fs::remove_file(&self.path);
        self.log_removal(removed);
    }
}
