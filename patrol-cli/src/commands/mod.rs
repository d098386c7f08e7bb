//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod destinations;
mod connectivity;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List the pre-selected destinations offered by the server
    Destinations {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Test connectivity from the cluster to one or more destinations
    Test(connectivity::TestArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Destinations { json } => destinations::list_destinations(config, json).await,
        Commands::Test(args) => connectivity::run_test(args, config).await,
    }
}
