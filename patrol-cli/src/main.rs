//! Ping Patrol CLI
//!
//! Command-line front end for the Ping Patrol server: browse the destination
//! catalog and run connectivity tests from inside the cluster.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "patrol")]
#[command(about = "Ping Patrol connectivity tester", long_about = None)]
struct Cli {
    /// Ping Patrol server URL
    #[arg(long, env = "PATROL_SERVER_URL", default_value = "http://localhost:5000")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
