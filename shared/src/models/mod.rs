//! Data models for the devscope dashboard core.
//!
//! This module contains the structures for parsed log lines, stats snapshots,
//! profiled events and recommendations.

pub mod event;
mod lenient;
pub mod log_line;
pub mod recommendation;
pub mod stats;

pub use event::{Event, Payload, Segment, HTTP_REQUEST};
pub use log_line::{LogContext, LogLevel, LogLine};
pub use recommendation::{Recommendation, RecommendationKind};
pub use stats::{AppStats, RuntimeStats};
