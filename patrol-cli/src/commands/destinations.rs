//! Destinations command handler

use anyhow::Result;
use colored::*;
use patrol_client::PatrolClient;

use crate::config::Config;

/// List the catalog entries
pub async fn list_destinations(config: &Config, json: bool) -> Result<()> {
    let client = PatrolClient::new(&config.server_url);
    let destinations = client.list_destinations().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&destinations)?);
        return Ok(());
    }

    if destinations.is_empty() {
        println!("{}", "No pre-selected destinations found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} pre-selected destination(s):", destinations.len()).bold()
    );
    println!();
    for destination in destinations {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            destination.name.bold(),
            format!("({})", destination.address).dimmed()
        );
    }

    Ok(())
}
