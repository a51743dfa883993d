/// Service configuration loader.
///
/// Settings resolve in three layers: built-in defaults, then an optional
/// `saferoute.toml` in the working directory, then environment variables
/// (`SAFEROUTE_PORT`, `SAFEROUTE_DB`, with `.env` support). A missing
/// file falls back to defaults; a malformed one is an error.

use std::env;
use std::fs;

use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_PATH: &str = "saferoute.db";

const CONFIG_PATH: &str = "saferoute.toml";

/// Runtime settings for the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// TCP port the API listens on.
    pub port: u16,
    /// Path of the SQLite database file, created on startup if absent.
    pub database_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from defaults, the optional TOML file, and
    /// the environment.
    pub fn load() -> Result<Self, String> {
        // Load .env file if present
        dotenv::dotenv().ok();

        let mut config = match fs::read_to_string(CONFIG_PATH) {
            Ok(contents) => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse {}: {}", CONFIG_PATH, e))?,
            Err(_) => ServiceConfig::default(),
        };

        if let Ok(port) = env::var("SAFEROUTE_PORT") {
            config.port = port
                .parse()
                .map_err(|_| format!("SAFEROUTE_PORT must be a port number, got '{}'", port))?;
        }
        if let Ok(path) = env::var("SAFEROUTE_DB") {
            config.database_path = path;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.database_path, "saferoute.db");
    }

    #[test]
    fn test_toml_partial_override_keeps_defaults() {
        let config: ServiceConfig = toml::from_str("port = 8080").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, DEFAULT_DATABASE_PATH);
    }

    #[test]
    fn test_toml_full_override() {
        let config: ServiceConfig =
            toml::from_str("port = 9000\ndatabase_path = \"/tmp/hazards.db\"").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.database_path, "/tmp/hazards.db");
    }

    #[test]
    fn test_toml_rejects_invalid_port() {
        let result: Result<ServiceConfig, _> = toml::from_str("port = 70000");
        assert!(result.is_err(), "ports must fit in u16");
    }
}
