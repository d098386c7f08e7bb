//! Ping Patrol HTTP Client
//!
//! A type-safe HTTP client for the Ping Patrol server API.
//!
//! # Example
//!
//! ```no_run
//! use patrol_client::PatrolClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PatrolClient::new("http://localhost:5000");
//!
//!     let results = client
//!         .run_test(vec!["google.com:443".to_string()])
//!         .await?;
//!
//!     for result in results {
//!         println!("{}: {:?}", result.destination, result.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod connectivity;
mod destinations;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Ping Patrol server API
#[derive(Debug, Clone)]
pub struct PatrolClient {
    /// Base URL of the server (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl PatrolClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use patrol_client::PatrolClient;
    ///
    /// let client = PatrolClient::new("http://localhost:5000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// Runs last as long as the probe job, so a configured timeout should
    /// exceed the server's polling budget.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Server returned {}: {}", status, error_text);
            return Err(ClientError::from_body(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
