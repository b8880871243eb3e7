//! Periodic stats snapshots written by the running server.
//!
//! Two independent producers write these files at their own cadence: the runtime
//! engine (connections, workers, memory) and the application (uptime, request and
//! error counters). Every field is optional on disk and defaults to zero.

use serde::{Deserialize, Serialize};

use super::lenient;

/// Snapshot of the runtime engine's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeStats {
    /// Open client connections.
    #[serde(deserialize_with = "lenient::u64")]
    pub connection_num: u64,

    /// Active worker processes.
    #[serde(deserialize_with = "lenient::u64")]
    pub worker_num: u64,

    /// Idle worker processes.
    #[serde(deserialize_with = "lenient::u64")]
    pub idle_worker_num: u64,

    /// Requests accepted since start.
    #[serde(deserialize_with = "lenient::u64")]
    pub request_count: u64,

    /// Live coroutines.
    #[serde(deserialize_with = "lenient::u64")]
    pub coroutine_num: u64,

    /// Current memory usage in bytes.
    #[serde(deserialize_with = "lenient::u64")]
    pub memory_total: u64,

    /// Peak memory usage in bytes.
    #[serde(deserialize_with = "lenient::u64")]
    pub memory_peak: u64,
}

/// Snapshot of the application's own counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppStats {
    /// Seconds since the application started, if the producer recorded it.
    #[serde(
        deserialize_with = "lenient::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub uptime: Option<u64>,

    /// Unix time the application started, if the producer recorded it.
    #[serde(
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<i64>,

    /// Requests handled.
    #[serde(deserialize_with = "lenient::u64")]
    pub requests: u64,

    /// Requests that ended in an error.
    #[serde(deserialize_with = "lenient::u64")]
    pub errors: u64,
}
