//! Server configuration

use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_DESTINATIONS_FILE: &str = "pre-selected-destinations.txt";

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// Catalog file served by `GET /api/destinations`
    pub destinations_file: PathBuf,

    /// Single allowed CORS origin; any origin is allowed when unset
    pub cors_origin: Option<String>,
}

impl ServerConfig {
    /// Creates configuration from environment variables
    ///
    /// - PATROL_BIND_ADDR (default: 0.0.0.0:5000)
    /// - PATROL_DESTINATIONS_FILE (default: pre-selected-destinations.txt)
    /// - PATROL_CORS_ORIGIN (optional)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            bind_addr: lookup("PATROL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            destinations_file: lookup("PATROL_DESTINATIONS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DESTINATIONS_FILE)),
            cors_origin: lookup("PATROL_CORS_ORIGIN").filter(|origin| !origin.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(
            config.destinations_file,
            PathBuf::from("pre-selected-destinations.txt")
        );
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(|key| match key {
            "PATROL_BIND_ADDR" => Some("127.0.0.1:8080".to_string()),
            "PATROL_DESTINATIONS_FILE" => Some("/etc/patrol/destinations.txt".to_string()),
            "PATROL_CORS_ORIGIN" => Some("https://patrol.example.com".to_string()),
            _ => None,
        });
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(
            config.destinations_file,
            PathBuf::from("/etc/patrol/destinations.txt")
        );
        assert_eq!(
            config.cors_origin.as_deref(),
            Some("https://patrol.example.com")
        );
    }

    #[test]
    fn test_blank_cors_origin_is_unset() {
        let config = ServerConfig::from_lookup(|key| {
            (key == "PATROL_CORS_ORIGIN").then(|| "  ".to_string())
        });
        assert!(config.cors_origin.is_none());
    }
}
