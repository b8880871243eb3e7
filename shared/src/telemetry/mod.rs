//! Telemetry snapshot of the monitored server.
//!
//! Two stats files are written periodically by independent producers. They are
//! loaded separately, reconciled, and turned into derived rates and a metrics view.

pub mod report;
pub mod snapshot;

pub use report::{
    ApplicationMetrics, ByteMetric, ConnectionMetrics, CoroutineMetrics, MemoryMetrics,
    MetricsReport, RequestCounts, RequestThroughput, RuntimeMetrics, UptimeMetrics,
    WorkerMetrics,
};
pub use snapshot::{
    average_response_time_ms, format_bytes, format_uptime, parse_memory_limit, round2,
    uptime_seconds, DerivedMetrics, StatsSources, TelemetrySnapshot, WorkerConfig,
};
