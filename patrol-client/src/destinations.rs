//! Destinations catalog endpoint

use crate::PatrolClient;
use crate::error::Result;
use patrol_core::domain::destination::Destination;

impl PatrolClient {
    /// List the pre-selected destinations offered by the server
    pub async fn list_destinations(&self) -> Result<Vec<Destination>> {
        let url = format!("{}/api/destinations", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
