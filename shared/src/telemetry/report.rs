//! The metrics view rendered from a [`TelemetrySnapshot`].

use serde::{Deserialize, Serialize};

use super::snapshot::{format_bytes, TelemetrySnapshot};

/// A count of active items with the configured or observed total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionMetrics {
    /// Currently open.
    pub active: u64,
    /// Total open.
    pub total: u64,
}

/// Worker pool occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerMetrics {
    /// Running workers.
    pub active: u64,
    /// Idle workers.
    pub idle: u64,
    /// Configured workers.
    pub total: u64,
}

/// Runtime request throughput.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestThroughput {
    /// Requests accepted by the runtime.
    pub total: u64,
    /// Requests per second of uptime.
    pub per_second: f64,
}

/// Live coroutines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoroutineMetrics {
    /// Currently alive.
    pub active: u64,
}

/// Counters reported by the runtime engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeMetrics {
    /// Client connections.
    pub connections: ConnectionMetrics,
    /// Worker pool.
    pub workers: WorkerMetrics,
    /// Request throughput.
    pub requests: RequestThroughput,
    /// Coroutines.
    pub coroutines: CoroutineMetrics,
}

/// Application request outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounts {
    /// Requests handled.
    pub total: u64,
    /// Requests that failed.
    pub errors: u64,
    /// Requests that succeeded.
    pub success: u64,
}

/// Application uptime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UptimeMetrics {
    /// Uptime in seconds.
    pub seconds: u64,
    /// Uptime as `1d 2h 3m 4s`.
    pub formatted: String,
}

/// Counters reported by the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationMetrics {
    /// Request outcomes.
    pub requests: RequestCounts,
    /// Uptime.
    pub uptime: UptimeMetrics,
    /// Mean HTTP request duration in milliseconds.
    pub average_response_time: f64,
}

/// A byte count with its human rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteMetric {
    /// Raw byte count.
    pub bytes: u64,
    /// Rendered value, e.g. `1.5 MB`.
    pub formatted: String,
}

impl ByteMetric {
    /// Creates a byte metric.
    #[must_use]
    pub fn new(bytes: u64) -> Self {
        Self {
            bytes,
            formatted: format_bytes(bytes),
        }
    }
}

/// Memory usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    /// Current usage.
    pub current: ByteMetric,
    /// Peak usage.
    pub peak: ByteMetric,
    /// Configured limit; `u64::MAX` when unlimited.
    pub limit: ByteMetric,
}

/// Runtime, application and memory metrics of the monitored server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Runtime engine counters.
    pub runtime: RuntimeMetrics,
    /// Application counters.
    pub application: ApplicationMetrics,
    /// Memory usage.
    pub memory: MemoryMetrics,
}

impl MetricsReport {
    /// Builds the report; `worker_total` is the configured worker count.
    #[must_use]
    pub fn from_snapshot(snapshot: &TelemetrySnapshot, worker_total: u32) -> Self {
        let runtime = &snapshot.runtime_stats;
        let app = &snapshot.app_stats;
        let derived = &snapshot.derived;

        Self {
            runtime: RuntimeMetrics {
                connections: ConnectionMetrics {
                    active: runtime.connection_num,
                    total: runtime.connection_num,
                },
                workers: WorkerMetrics {
                    active: runtime.worker_num,
                    idle: runtime.idle_worker_num,
                    total: u64::from(worker_total),
                },
                requests: RequestThroughput {
                    total: runtime.request_count,
                    per_second: derived.requests_per_second,
                },
                coroutines: CoroutineMetrics {
                    active: runtime.coroutine_num,
                },
            },
            application: ApplicationMetrics {
                requests: RequestCounts {
                    total: app.requests,
                    errors: app.errors,
                    success: derived.success_count,
                },
                uptime: UptimeMetrics {
                    seconds: derived.uptime_seconds,
                    formatted: derived.uptime_formatted.clone(),
                },
                average_response_time: derived.average_response_time_ms,
            },
            memory: MemoryMetrics {
                current: ByteMetric::new(runtime.memory_total),
                peak: ByteMetric::new(runtime.memory_peak),
                limit: ByteMetric::new(derived.memory_limit_bytes),
            },
        }
    }
}
