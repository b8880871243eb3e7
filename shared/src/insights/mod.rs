//! Dashboard-wide view of the monitored server.
//!
//! [`InsightsCollector`] combines the log aggregator, the telemetry snapshot, the
//! event history and the recommendation engine. Each section is computed on its own,
//! so a failing collaborator only empties the sections that depend on it.

pub mod recommend;

pub use recommend::{RecommendationEngine, ERROR_RATE_THRESHOLD_PERCENT, MEMORY_THRESHOLD_PERCENT};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::{ConfigError, DevToolsConfig};
use crate::history::{
    ErrorReport, EventHistoryProvider, EventHistoryView, HistoryStatistics, ProfiledEvent,
    RequestSummary, SyncStatus, SyncStatusProvider,
};
use crate::logs::LogAggregator;
use crate::models::{LogContext, LogLevel, LogLine, Recommendation};
use crate::telemetry::{uptime_seconds, MetricsReport, TelemetrySnapshot};

/// Requests listed in the full report.
pub const REPORT_REQUEST_LIMIT: usize = 50;

/// Log lines listed in the full report.
pub const REPORT_LOG_LINES: usize = 100;

/// Profiled events listed in the full report.
pub const REPORT_PROFILER_LIMIT: usize = 50;

/// A parsed log line as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp found in the line, or the time of rendering when there was none.
    pub timestamp: String,
    /// Severity.
    pub level: LogLevel,
    /// Message without timestamp and level.
    pub message: String,
    /// Source location mentioned in the line.
    pub context: LogContext,
    /// Log file the line came from.
    pub file: String,
}

impl LogRecord {
    /// Renders `line`, using `now` when it has no timestamp.
    #[must_use]
    pub fn from_line(line: LogLine, now: &str) -> Self {
        Self {
            timestamp: line.timestamp.unwrap_or_else(|| now.to_string()),
            level: line.level,
            message: line.message,
            context: line.context,
            file: line.source_file,
        }
    }
}

/// Recent log lines across every log file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogsSection {
    /// Newest first.
    pub recent: Vec<LogRecord>,
    /// Log file names, newest first.
    pub files: Vec<String>,
    /// Number of lines in `recent`.
    pub total_lines: usize,
}

/// Recent profiled events and history statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilerSection {
    /// Newest first.
    pub events: Vec<ProfiledEvent>,
    /// Number of events in the whole history.
    pub total: usize,
    /// Statistics over the whole history.
    pub statistics: HistoryStatistics,
}

/// Identity of the monitored server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMeta {
    /// Application name.
    pub name: String,
    /// Version of this crate.
    pub version: String,
    /// Uptime in seconds.
    pub uptime: u64,
    /// `development` or `production`.
    pub environment: String,
}

/// When and about what the report was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// RFC 3339 time of the report.
    pub timestamp: String,
    /// Server identity.
    pub server: ServerMeta,
}

/// Everything the dashboard shows, in one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    /// Report metadata.
    pub meta: Meta,
    /// Runtime, application and memory metrics.
    pub metrics: MetricsReport,
    /// Recent HTTP requests.
    pub requests: Vec<RequestSummary>,
    /// Failed HTTP requests.
    pub errors: Vec<ErrorReport>,
    /// Recent log lines.
    pub logs: LogsSection,
    /// Recent profiled events.
    pub profiler: ProfilerSection,
    /// Advisory findings.
    pub recommendations: Vec<Recommendation>,
}

/// Collects dashboard data for one monitored server.
///
/// Collaborators are injected explicitly; without them the sections that need them
/// are empty.
///
/// # Example
///
/// ```no_run
/// use shared::config::DevToolsConfig;
/// use shared::history::InMemoryEventHistory;
/// use shared::insights::InsightsCollector;
/// use std::sync::Arc;
///
/// let history = Arc::new(InMemoryEventHistory::default());
/// let collector = InsightsCollector::new(DevToolsConfig::new("var"))
///     .unwrap()
///     .with_event_history(history);
///
/// let report = collector.collect();
/// println!("{} findings", report.recommendations.len());
/// ```
#[derive(Clone)]
pub struct InsightsCollector {
    config: DevToolsConfig,
    aggregator: LogAggregator,
    event_history: Option<Arc<dyn EventHistoryProvider>>,
    sync_status: Option<Arc<dyn SyncStatusProvider>>,
}

impl fmt::Debug for InsightsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightsCollector")
            .field("config", &self.config)
            .field("event_history", &self.event_history.is_some())
            .field("sync_status", &self.sync_status.is_some())
            .finish_non_exhaustive()
    }
}

impl InsightsCollector {
    /// Creates a collector without collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: DevToolsConfig) -> Result<Self, ConfigError> {
        config.validate_config()?;
        let aggregator = config.aggregator()?;
        Ok(Self {
            config,
            aggregator,
            event_history: None,
            sync_status: None,
        })
    }

    /// Attaches the event history collaborator.
    #[must_use]
    pub fn with_event_history(mut self, provider: Arc<dyn EventHistoryProvider>) -> Self {
        self.event_history = Some(provider);
        self
    }

    /// Attaches the synchronization status collaborator.
    #[must_use]
    pub fn with_sync_status(mut self, provider: Arc<dyn SyncStatusProvider>) -> Self {
        self.sync_status = Some(provider);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DevToolsConfig {
        &self.config
    }

    /// Returns the log aggregator.
    #[must_use]
    pub fn aggregator(&self) -> &LogAggregator {
        &self.aggregator
    }

    /// Loads the current event history.
    #[must_use]
    pub fn history(&self) -> EventHistoryView {
        EventHistoryView::load(self.event_history.as_deref())
    }

    /// Computes the telemetry snapshot from the stats files and `history`.
    #[must_use]
    pub fn snapshot(&self, history: &EventHistoryView) -> TelemetrySnapshot {
        TelemetrySnapshot::compute(
            &self.config.stats_sources(),
            &self.config.worker_config(),
            history.events(),
        )
    }

    /// Runtime, application and memory metrics.
    #[must_use]
    pub fn metrics(&self) -> MetricsReport {
        let snapshot = self.snapshot(&self.history());
        MetricsReport::from_snapshot(&snapshot, self.config.worker_num)
    }

    /// The newest `lines` log lines across every log file.
    #[must_use]
    pub fn logs(&self, lines: usize) -> LogsSection {
        self.search_logs(lines, None)
    }

    /// Like [`InsightsCollector::logs`], keeping only lines containing `filter`.
    #[must_use]
    pub fn search_logs(&self, lines: usize, filter: Option<&str>) -> LogsSection {
        let aggregated = self.aggregator.collect(lines, filter);
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false);

        let recent: Vec<LogRecord> = aggregated
            .entries
            .into_iter()
            .map(|line| LogRecord::from_line(line, &now))
            .collect();

        LogsSection {
            total_lines: recent.len(),
            recent,
            files: aggregated.files,
        }
    }

    /// The newest `limit` profiled events, optionally of one kind only.
    #[must_use]
    pub fn profiler(&self, kind: Option<&str>, limit: usize) -> ProfilerSection {
        profiler_section(&self.history(), kind, limit)
    }

    /// Advisory findings for the current telemetry.
    #[must_use]
    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.recommendations_for(&self.snapshot(&self.history()))
    }

    /// Report metadata.
    #[must_use]
    pub fn meta(&self) -> Meta {
        let uptime = uptime_seconds(
            &self.config.stats_sources().load_app(),
            Utc::now().timestamp(),
        );
        self.meta_with_uptime(uptime)
    }

    /// The full dashboard report.
    ///
    /// The history and the stats files are read once and shared by every section.
    #[must_use]
    pub fn collect(&self) -> InsightsReport {
        let history = self.history();
        let snapshot = self.snapshot(&history);

        InsightsReport {
            meta: self.meta_with_uptime(snapshot.derived.uptime_seconds),
            metrics: MetricsReport::from_snapshot(&snapshot, self.config.worker_num),
            requests: history.requests(REPORT_REQUEST_LIMIT),
            errors: history.errors(),
            logs: self.logs(REPORT_LOG_LINES),
            profiler: profiler_section(&history, None, REPORT_PROFILER_LIMIT),
            recommendations: self.recommendations_for(&snapshot),
        }
    }

    fn recommendations_for(&self, snapshot: &TelemetrySnapshot) -> Vec<Recommendation> {
        let sync = self.sync_status();
        RecommendationEngine.evaluate(
            snapshot,
            snapshot.derived.memory_limit_bytes,
            snapshot.runtime_stats.memory_total,
            sync.as_ref(),
        )
    }

    fn sync_status(&self) -> Option<SyncStatus> {
        let provider = self.sync_status.as_ref()?;
        match provider.sync_status() {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!(error = %e, "Sync status unavailable");
                None
            }
        }
    }

    fn meta_with_uptime(&self, uptime: u64) -> Meta {
        let environment = if self.config.is_development() {
            "development"
        } else {
            "production"
        };

        Meta {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            server: ServerMeta {
                name: self.config.app_name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime,
                environment: environment.to_string(),
            },
        }
    }
}

fn profiler_section(history: &EventHistoryView, kind: Option<&str>, limit: usize) -> ProfilerSection {
    ProfilerSection {
        events: history.profiler_events(kind, limit),
        total: history.events().len(),
        statistics: history.statistics(),
    }
}
