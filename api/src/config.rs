//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use shared::config::DevToolsConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `DEVSCOPE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `DEVSCOPE_PORT`: The port to listen on (default: 8080)
/// - `DEVSCOPE_VAR_DIR`: Directory with stats files and `log/` (default: "var")
/// - `DEVSCOPE_APP_NAME`: Application name used in stats file names (default: "devscope")
/// - `DEVSCOPE_ENV`: Deployment environment (default: "development")
/// - `DEVSCOPE_WORKER_NUM`: Configured worker count (default: 4)
/// - `DEVSCOPE_MEMORY_LIMIT`: Memory limit such as `512M`, `-1` for none (default: "-1")
/// - `DEVSCOPE_SOURCE_EXTENSIONS`: Comma-separated source extensions recognized in logs
/// - `DEVSCOPE_RUNTIME_STATS_PREFIX`: Prefix of the runtime stats file (default: "runtime-stats")
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Layout of the monitored server.
    pub devtools: DevToolsConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DEVSCOPE_PORT` is set but cannot be parsed as a valid port number
    /// - `DEVSCOPE_HOST` is not an IP address
    /// - `DEVSCOPE_WORKER_NUM` is set but is not a number
    /// - the resulting configuration fails validation
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("DEVSCOPE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("DEVSCOPE_PORT")
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("DEVSCOPE_PORT must be a valid port number")?
            .unwrap_or(8080);

        let mut devtools = DevToolsConfig::default();
        if let Some(var_dir) = lookup("DEVSCOPE_VAR_DIR") {
            devtools.var_dir = PathBuf::from(var_dir);
        }
        if let Some(app_name) = lookup("DEVSCOPE_APP_NAME") {
            devtools.app_name = app_name;
        }
        if let Some(environment) = lookup("DEVSCOPE_ENV") {
            devtools.environment = environment;
        }
        if let Some(worker_num) = lookup("DEVSCOPE_WORKER_NUM") {
            devtools.worker_num = worker_num
                .parse()
                .context("DEVSCOPE_WORKER_NUM must be a positive number")?;
        }
        if let Some(memory_limit) = lookup("DEVSCOPE_MEMORY_LIMIT") {
            devtools.memory_limit = memory_limit;
        }
        if let Some(extensions) = lookup("DEVSCOPE_SOURCE_EXTENSIONS") {
            devtools.source_extensions = extensions
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(prefix) = lookup("DEVSCOPE_RUNTIME_STATS_PREFIX") {
            devtools.runtime_stats_prefix = prefix;
        }

        devtools.validate_config()?;

        let config = Self {
            host,
            port,
            devtools,
        };
        config.socket_addr()?;
        Ok(config)
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.host
            .parse::<IpAddr>()
            .map(|ip| SocketAddr::new(ip, self.port))
            .with_context(|| format!("DEVSCOPE_HOST must be an IP address, got {}", self.host))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            devtools: DevToolsConfig::default(),
        }
    }
}
