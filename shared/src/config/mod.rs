//! Configuration of the monitored server's layout.
//!
//! Everything the core reads lives under one `var` directory: the two stats files
//! named after the application slug, and log files under `log/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use validator::Validate;

use crate::logs::{LogAggregator, LogLineParser, LogSource, ParserError, DEFAULT_SOURCE_EXTENSIONS};
use crate::telemetry::{StatsSources, WorkerConfig};

/// Default file name prefix of the runtime stats file.
pub const DEFAULT_RUNTIME_STATS_PREFIX: &str = "runtime-stats";

/// Errors that can occur while validating or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// The source extensions could not be turned into a parser.
    #[error("Invalid source extensions: {0}")]
    Parser(#[from] ParserError),
}

/// Where and how to read the monitored server's telemetry.
///
/// # Example
///
/// ```
/// use shared::config::DevToolsConfig;
/// use std::path::Path;
///
/// let config = DevToolsConfig::new("/srv/app/var").with_app_name("Shop API");
///
/// assert_eq!(config.app_slug(), "shop-api");
/// assert_eq!(config.log_dir(), Path::new("/srv/app/var/log"));
/// assert_eq!(
///     config.runtime_stats_path(),
///     Path::new("/srv/app/var/runtime-stats-shop-api.json")
/// );
/// assert!(config.validate_config().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DevToolsConfig {
    /// Directory holding the stats files and the `log/` directory.
    pub var_dir: PathBuf,

    /// Application name; its slug names the stats files.
    #[validate(length(min = 1, message = "Application name cannot be empty"))]
    pub app_name: String,

    /// Deployment environment, e.g. `development` or `production`.
    pub environment: String,

    /// Configured number of workers.
    #[validate(range(min = 1, max = 4096, message = "Worker count must be between 1 and 4096"))]
    pub worker_num: u32,

    /// Memory limit as configured on the server, e.g. `256M` or `-1`.
    pub memory_limit: String,

    /// Extension of log files in the log directory.
    #[validate(length(min = 1, message = "Log file extension cannot be empty"))]
    pub log_extension: String,

    /// Source file extensions recognized in log lines.
    #[validate(length(min = 1, message = "At least one source extension is required"))]
    pub source_extensions: Vec<String>,

    /// File name prefix of the runtime stats file, `<prefix>-<slug>.json`.
    ///
    /// Swoole based servers write `swoole-stats`.
    #[validate(length(min = 1, message = "Runtime stats prefix cannot be empty"))]
    pub runtime_stats_prefix: String,
}

impl DevToolsConfig {
    /// Creates a configuration rooted at `var_dir` with default settings.
    #[must_use]
    pub fn new(var_dir: impl Into<PathBuf>) -> Self {
        Self {
            var_dir: var_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the application name.
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Sets the deployment environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Sets the configured worker count.
    #[must_use]
    pub fn with_worker_num(mut self, worker_num: u32) -> Self {
        self.worker_num = worker_num;
        self
    }

    /// Sets the memory limit.
    #[must_use]
    pub fn with_memory_limit(mut self, memory_limit: impl Into<String>) -> Self {
        self.memory_limit = memory_limit.into();
        self
    }

    /// Sets the source extensions recognized in log lines.
    #[must_use]
    pub fn with_source_extensions<S: Into<String>>(
        mut self,
        extensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.source_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the file name prefix of the runtime stats file.
    #[must_use]
    pub fn with_runtime_stats_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.runtime_stats_prefix = prefix.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the application name, log extension or runtime stats prefix is empty
    /// - the worker count is outside 1..=4096
    /// - no source extension is given
    pub fn validate_config(&self) -> Result<(), ConfigError> {
        self.validate()?;
        Ok(())
    }

    /// Application name reduced to lowercase letters, digits and `-`.
    ///
    /// Each run of other characters becomes a single `-`.
    #[must_use]
    pub fn app_slug(&self) -> String {
        let mut slug = String::with_capacity(self.app_name.len());
        let mut in_run = false;
        for c in self.app_name.chars() {
            if c.is_ascii_alphanumeric() || c == '-' {
                slug.push(c.to_ascii_lowercase());
                in_run = false;
            } else if !in_run {
                slug.push('-');
                in_run = true;
            }
        }
        slug
    }

    /// True unless the environment is `production`.
    #[must_use]
    pub fn is_development(&self) -> bool {
        !self.environment.eq_ignore_ascii_case("production")
    }

    /// Directory holding the log files.
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.var_dir.join("log")
    }

    /// Path of the application stats file.
    #[must_use]
    pub fn app_stats_path(&self) -> PathBuf {
        self.var_dir
            .join(format!("server-stats-{}.json", self.app_slug()))
    }

    /// Path of the runtime engine stats file.
    #[must_use]
    pub fn runtime_stats_path(&self) -> PathBuf {
        self.var_dir
            .join(format!("{}-{}.json", self.runtime_stats_prefix, self.app_slug()))
    }

    /// Both stats file locations.
    #[must_use]
    pub fn stats_sources(&self) -> StatsSources {
        StatsSources::new(self.runtime_stats_path(), self.app_stats_path())
    }

    /// Worker settings.
    #[must_use]
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            worker_num: self.worker_num,
            memory_limit: self.memory_limit.clone(),
        }
    }

    /// The log directory as a log source.
    #[must_use]
    pub fn log_source(&self) -> LogSource {
        LogSource::new(self.log_dir(), self.log_extension.clone())
    }

    /// A parser recognizing the configured source extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if an extension is empty or contains invalid characters.
    pub fn parser(&self) -> Result<LogLineParser, ConfigError> {
        Ok(LogLineParser::new(&self.source_extensions)?)
    }

    /// An aggregator over the log directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the source extensions are invalid.
    pub fn aggregator(&self) -> Result<LogAggregator, ConfigError> {
        Ok(LogAggregator::new(self.log_source(), self.parser()?))
    }
}

impl Default for DevToolsConfig {
    fn default() -> Self {
        Self {
            var_dir: PathBuf::from("var"),
            app_name: "devscope".to_string(),
            environment: "development".to_string(),
            worker_num: 4,
            memory_limit: "-1".to_string(),
            log_extension: "log".to_string(),
            source_extensions: DEFAULT_SOURCE_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            runtime_stats_prefix: DEFAULT_RUNTIME_STATS_PREFIX.to_string(),
        }
    }
}
