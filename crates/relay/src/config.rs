//! Configuration management for the relay server.
//!
//! Settings are layered, highest priority first: command-line flags, the
//! `PORT` environment variable (port only), the TOML configuration file, and
//! built-in defaults.

use crate::cli::CliArgs;
use anyhow::{anyhow, Context, Result};
use relay_server::config::DEFAULT_PORT;
use relay_server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Environment variable consulted for the listen port.
pub const PORT_ENV: &str = "PORT";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration settings
    pub server: ServerSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Network binding and connection limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to listen on
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum number of concurrently connected players
    pub max_connections: usize,
    /// Frames buffered per client before sends to it are dropped
    pub outbound_queue_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_connections: 1000,
            outbound_queue_capacity: 256,
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file, or the defaults if the file
    /// does not exist.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Applies the `PORT` environment value and then the command-line flags.
    pub fn apply_overrides(&mut self, args: &CliArgs, env_port: Option<&str>) -> Result<()> {
        if let Some(raw) = env_port {
            self.server.port = raw
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid {PORT_ENV} value {raw:?}: {e}"))?;
        }
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if args.json_logs {
            self.logging.json_format = true;
        }
        Ok(())
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.host.parse::<IpAddr>().is_err() {
            return Err(format!("Invalid host: {}", self.server.host));
        }
        if self.server.port == 0 {
            return Err("Port must be non-zero".to_string());
        }
        if self.server.max_connections == 0 {
            return Err("max_connections must be at least 1".to_string());
        }
        if self.server.outbound_queue_capacity == 0 {
            return Err("outbound_queue_capacity must be at least 1".to_string());
        }
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {VALID_LOG_LEVELS:?}",
                self.logging.level
            ));
        }
        Ok(())
    }

    /// Converts the application configuration to a relay server configuration.
    pub fn to_server_config(&self) -> Result<ServerConfig> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid host: {}", self.server.host))?;
        Ok(ServerConfig {
            bind_address: SocketAddr::new(ip, self.server.port),
            max_connections: self.server.max_connections,
            outbound_queue_capacity: self.server.outbound_queue_capacity,
        })
    }
}
