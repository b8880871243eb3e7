//! Log line data model.
//!
//! Defines the `LogLine` structure produced by heuristically parsing one raw line
//! of an unstructured log file.

use serde::{Deserialize, Serialize};

/// Log severity level.
///
/// The variants mirror the keywords recognized in raw log text, so both `WARNING`
/// and `WARN` exist as distinct levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Error conditions.
    Error,
    /// Warning conditions (spelled out).
    Warning,
    /// Warning conditions (abbreviated).
    Warn,
    /// Informational messages.
    #[default]
    Info,
    /// Debug information.
    Debug,
    /// Detailed trace information.
    Trace,
}

impl LogLevel {
    /// Keyword search order used when classifying a raw line.
    ///
    /// The first keyword found anywhere in the line wins, regardless of its position.
    pub const SEARCH_ORDER: [LogLevel; 6] = [
        Self::Error,
        Self::Warning,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    /// Returns the uppercase keyword for this level.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Structured context recovered from a log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogContext {
    /// Source file path mentioned in the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Line number following the source file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Name of the method invoked via `->name(`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl LogContext {
    /// Returns true if no context field was recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.line.is_none() && self.function.is_none()
    }
}

/// A single parsed log line.
///
/// # Example
///
/// ```
/// use shared::models::{LogLevel, LogLine};
///
/// let line = LogLine::new("boot complete", "app.log");
/// assert_eq!(line.level, LogLevel::Info);
/// assert!(line.timestamp.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    /// The trimmed raw text of the line.
    pub raw: String,

    /// Timestamp text found in the line, if any.
    pub timestamp: Option<String>,

    /// Detected severity level.
    #[serde(default)]
    pub level: LogLevel,

    /// The line with timestamp and level keywords removed.
    pub message: String,

    /// Source location and function recovered from the line.
    #[serde(default)]
    pub context: LogContext,

    /// Name of the log file the line was read from.
    pub source_file: String,
}

impl LogLine {
    /// Creates an unparsed log line whose message is the raw text.
    #[must_use]
    pub fn new(raw: impl Into<String>, source_file: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            message: raw.trim().to_string(),
            raw,
            timestamp: None,
            level: LogLevel::Info,
            context: LogContext::default(),
            source_file: source_file.into(),
        }
    }

    /// Sets the timestamp text.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Returns the timestamp used for ordering; lines without one sort last.
    #[must_use]
    pub fn sort_key(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }
}
