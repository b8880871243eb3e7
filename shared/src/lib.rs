//! Devscope Shared Library
//!
//! This crate contains the telemetry-ingestion core of the devscope dashboard:
//! reading and merging log files, reconciling stats snapshots, querying the event
//! history and turning all of it into recommendations.
//!
//! # Modules
//!
//! - [`logs`] - Chunked tail reader, log line parser and multi-file aggregator
//! - [`telemetry`] - Stats snapshot with derived rates and the metrics report
//! - [`history`] - Read-only queries over the external event history
//! - [`insights`] - Recommendation engine and the dashboard-wide collector
//! - [`config`] - Layout of the monitored server's `var` directory
//! - [`models`] - Data models shared by every module
//! - [`ordering`] - Newest-first top-N selection
//!
//! # Example
//!
//! ```
//! use shared::logs::LogLineParser;
//! use shared::models::LogLevel;
//!
//! let line = LogLineParser::default().parse(
//!     "[2024-01-02T03:04:05Z] ERROR Something failed in /srv/app/src/main.rs:42",
//!     "app.log",
//! );
//!
//! assert_eq!(line.level, LogLevel::Error);
//! assert_eq!(line.message, "Something failed in /srv/app/src/main.rs:42");
//! assert_eq!(line.context.line, Some(42));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod history;
pub mod insights;
pub mod logs;
pub mod models;
pub mod ordering;
pub mod telemetry;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
