//! Ping Patrol Controller
//!
//! Turns a connectivity test request into a probe job on the cluster, tracks
//! the job to a terminal state and extracts the agent's results.
//!
//! # Example
//!
//! ```no_run
//! use patrol_controller::{ControllerConfig, KubectlClient, RunController};
//! use patrol_core::domain::request::TestRequest;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ControllerConfig::from_env()?;
//!     let cluster = Arc::new(KubectlClient::new(config.kubectl.clone()));
//!     let controller = RunController::from_config(config, cluster)?;
//!
//!     let request = TestRequest::new(["google.com:443", "http://example.com"])?;
//!     for result in controller.execute(&request).await? {
//!         println!("{}: {:?}", result.destination, result.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod cluster;
pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod state;

// Re-export commonly used types
pub use cluster::{ClusterJobClient, KubectlClient};
pub use config::ControllerConfig;
pub use controller::{RunController, RunReport};
pub use error::{Result, RunError};
