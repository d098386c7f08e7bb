//! Connectivity test endpoint

use crate::PatrolClient;
use crate::error::Result;
use patrol_core::domain::probe::ProbeResult;
use patrol_core::dto::test::RunTestRequest;

impl PatrolClient {
    /// Run a connectivity test and wait for its results
    ///
    /// # Arguments
    /// * `destinations` - Addresses to probe, e.g. `google.com:443` or `http://example.com`
    ///
    /// # Returns
    /// One result per destination, in the order the probe agent reported them
    pub async fn run_test(&self, destinations: Vec<String>) -> Result<Vec<ProbeResult>> {
        let url = format!("{}/api/test", self.base_url);
        tracing::debug!("Requesting test of {} destination(s)", destinations.len());

        let response = self
            .client
            .post(&url)
            .json(&RunTestRequest { destinations })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
