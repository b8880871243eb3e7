//! Reconciles the runtime and application stats files into one view.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{AppStats, Event, RuntimeStats};

/// Locations of the two stats files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSources {
    /// Runtime engine stats (`<prefix>-<slug>.json`, see `DevToolsConfig::runtime_stats_prefix`).
    pub runtime_stats_path: PathBuf,
    /// Application stats (`server-stats-<slug>.json`).
    pub app_stats_path: PathBuf,
}

impl StatsSources {
    /// Creates stats sources from explicit paths.
    #[must_use]
    pub fn new(runtime_stats_path: impl Into<PathBuf>, app_stats_path: impl Into<PathBuf>) -> Self {
        Self {
            runtime_stats_path: runtime_stats_path.into(),
            app_stats_path: app_stats_path.into(),
        }
    }

    /// Loads the runtime stats, or defaults when the file is missing or invalid.
    #[must_use]
    pub fn load_runtime(&self) -> RuntimeStats {
        load_json(&self.runtime_stats_path)
    }

    /// Loads the application stats, or defaults when the file is missing or invalid.
    #[must_use]
    pub fn load_app(&self) -> AppStats {
        load_json(&self.app_stats_path)
    }
}

fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Stats file not readable");
            return T::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::debug!(path = %path.display(), error = %e, "Stats file is not a valid stats object");
        T::default()
    })
}

/// Worker settings of the monitored server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Configured number of workers.
    pub worker_num: u32,
    /// Memory limit as written in the server configuration, e.g. `256M` or `-1`.
    pub memory_limit: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_num: 4,
            memory_limit: "-1".to_string(),
        }
    }
}

/// Values derived from the raw stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Seconds since the application started.
    pub uptime_seconds: u64,
    /// Uptime rendered as `1d 2h 3m 4s`.
    pub uptime_formatted: String,
    /// Runtime requests per second of uptime, rounded to 2 decimals.
    pub requests_per_second: f64,
    /// Percentage of application requests that failed.
    pub error_rate: f64,
    /// Application requests that did not fail.
    pub success_count: u64,
    /// Memory limit in bytes; `u64::MAX` when unlimited.
    pub memory_limit_bytes: u64,
    /// Mean duration of recorded HTTP requests, rounded to 2 decimals.
    pub average_response_time_ms: f64,
}

/// Point-in-time telemetry for the monitored server.
///
/// # Example
///
/// ```no_run
/// use shared::telemetry::{StatsSources, TelemetrySnapshot, WorkerConfig};
///
/// let sources = StatsSources::new(
///     "var/runtime-stats-devscope.json",
///     "var/server-stats-devscope.json",
/// );
/// let snapshot = TelemetrySnapshot::compute(&sources, &WorkerConfig::default(), &[]);
/// println!("error rate: {:.1}%", snapshot.derived.error_rate);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Raw runtime engine counters.
    pub runtime_stats: RuntimeStats,
    /// Raw application counters.
    pub app_stats: AppStats,
    /// Derived values.
    pub derived: DerivedMetrics,
}

impl TelemetrySnapshot {
    /// Loads both stats files and derives metrics as of now.
    #[must_use]
    pub fn compute(sources: &StatsSources, worker: &WorkerConfig, history: &[Event]) -> Self {
        Self::compute_at(sources, worker, history, Utc::now().timestamp())
    }

    /// Loads both stats files and derives metrics as of `now` (unix seconds).
    #[must_use]
    pub fn compute_at(
        sources: &StatsSources,
        worker: &WorkerConfig,
        history: &[Event],
        now: i64,
    ) -> Self {
        Self::from_stats(
            sources.load_runtime(),
            sources.load_app(),
            worker,
            history,
            now,
        )
    }

    /// Derives metrics from already loaded stats.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_stats(
        runtime_stats: RuntimeStats,
        app_stats: AppStats,
        worker: &WorkerConfig,
        history: &[Event],
        now: i64,
    ) -> Self {
        let uptime_seconds = uptime_seconds(&app_stats, now);
        let requests_per_second = if uptime_seconds > 0 {
            round2(runtime_stats.request_count as f64 / uptime_seconds as f64)
        } else {
            0.0
        };

        let derived = DerivedMetrics {
            uptime_seconds,
            uptime_formatted: format_uptime(uptime_seconds),
            requests_per_second,
            error_rate: app_stats.errors as f64 * 100.0 / app_stats.requests.max(1) as f64,
            success_count: app_stats.requests.saturating_sub(app_stats.errors),
            memory_limit_bytes: parse_memory_limit(&worker.memory_limit),
            average_response_time_ms: average_response_time_ms(history),
        };

        Self {
            runtime_stats,
            app_stats,
            derived,
        }
    }
}

/// Uptime from the recorded value, else from the start time, else zero.
#[must_use]
pub fn uptime_seconds(app: &AppStats, now: i64) -> u64 {
    match (app.uptime, app.start_time) {
        (Some(uptime), _) => uptime,
        (None, Some(start)) => u64::try_from(now.saturating_sub(start)).unwrap_or(0),
        (None, None) => 0,
    }
}

/// Mean `payload.duration` of the HTTP request events that record one.
///
/// Rounded to 2 decimals; `0.0` when no request records a duration.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_response_time_ms(history: &[Event]) -> f64 {
    let durations: Vec<f64> = history
        .iter()
        .filter(|e| e.is_http_request())
        .filter_map(|e| e.payload.duration)
        .collect();

    if durations.is_empty() {
        return 0.0;
    }
    round2(durations.iter().sum::<f64>() / durations.len() as f64)
}

/// Parses a memory limit such as `512M` into bytes.
///
/// The suffixes `g`, `m` and `k` (any case) multiply by powers of 1024. Only the
/// leading integer is read, so `"128MB"` is 128 bytes. `-1` means unlimited and
/// maps to `u64::MAX`; other negative values and unparseable input map to 0.
///
/// # Example
///
/// ```
/// use shared::telemetry::parse_memory_limit;
///
/// assert_eq!(parse_memory_limit("256M"), 256 * 1024 * 1024);
/// assert_eq!(parse_memory_limit("1g"), 1024 * 1024 * 1024);
/// assert_eq!(parse_memory_limit("-1"), u64::MAX);
/// ```
#[must_use]
pub fn parse_memory_limit(limit: &str) -> u64 {
    let limit = limit.trim();
    if limit == "-1" {
        return u64::MAX;
    }
    if limit.starts_with('-') {
        return 0;
    }

    let digits = limit.trim_start_matches('+');
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: u64 = digits[..end].parse().unwrap_or(0);

    let multiplier: u64 = match limit.chars().last().map(|c| c.to_ascii_lowercase()) {
        Some('g') => 1024 * 1024 * 1024,
        Some('m') => 1024 * 1024,
        Some('k') => 1024,
        _ => 1,
    };
    value.saturating_mul(multiplier)
}

/// Renders seconds as `1d 2h 3m 4s`, omitting zero days, hours and minutes.
#[must_use]
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = seconds % 86_400 / 3_600;
    let minutes = seconds % 3_600 / 60;
    let secs = seconds % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{secs}s"));
    parts.join(" ")
}

/// Renders a byte count with a binary unit, e.g. `1.5 MB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", round2(value), UNITS[unit])
}

/// Rounds to 2 decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
