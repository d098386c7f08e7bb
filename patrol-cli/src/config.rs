//! Configuration module

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Ping Patrol server
    pub server_url: String,
}
