//! Event history data model.
//!
//! Events are produced by an external profiler and consumed read-only. Each event
//! carries a payload and an ordered list of segments (sub-spans of its trace).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::lenient;

/// Event kind recorded for every handled HTTP request.
pub const HTTP_REQUEST: &str = "http_request";

fn unknown_kind() -> String {
    "unknown".to_string()
}

/// Payload attached to an event or a segment.
///
/// Only the keys the dashboard reads are modelled; anything else is kept verbatim
/// in [`Payload::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Elapsed time in milliseconds.
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<f64>,

    /// HTTP method.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub method: Option<String>,

    /// Request path.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub path: Option<String>,

    /// HTTP response status.
    #[serde(
        default,
        deserialize_with = "lenient::opt_u16",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<u16>,

    /// Memory used while handling the request, in bytes.
    #[serde(
        default,
        deserialize_with = "lenient::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub memory: Option<u64>,

    /// Request headers as recorded by the profiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<Value>,

    /// Response headers as recorded by the profiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Value>,

    /// Query parameters of a request, or the SQL text of a database segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,

    /// Bound parameters of a database segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Error attached to a request: either a message string or an object with
    /// `message`, `file`, `line` and `trace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,

    /// Error message of an `error`/`exception` segment.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,

    /// Source file of an `error`/`exception` segment.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub file: Option<String>,

    /// Source line of an `error`/`exception` segment.
    #[serde(
        default,
        deserialize_with = "lenient::opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub line: Option<u32>,

    /// Stack trace of an `error`/`exception` segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Value>,

    /// Any other payload keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Payload {
    /// Creates a payload carrying only a duration.
    #[must_use]
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }
}

/// A sub-span of an event's trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment kind, e.g. `database_query` or `exception`.
    #[serde(rename = "type", default = "unknown_kind", deserialize_with = "kind")]
    pub kind: String,

    /// Start of the segment in unix seconds.
    #[serde(default, deserialize_with = "lenient::f64")]
    pub timestamp: f64,

    /// Segment payload.
    #[serde(default)]
    pub payload: Payload,
}

impl Segment {
    /// Creates a segment.
    #[must_use]
    pub fn new(kind: impl Into<String>, timestamp: f64, payload: Payload) -> Self {
        Self {
            kind: kind.into(),
            timestamp,
            payload,
        }
    }
}

/// A profiled event from the external event history.
///
/// # Example
///
/// ```
/// use shared::models::{Event, Payload, Segment};
///
/// let event = Event::new("ev-1", "http_request", 1_700_000_000.5)
///     .with_segment(Segment::new("db", 1_700_000_000.6, Payload::with_duration(2.5)))
///     .with_segment(Segment::new("render", 1_700_000_000.7, Payload::with_duration(1.0)));
///
/// assert_eq!(event.duration(), Some(3.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier.
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,

    /// Event kind, e.g. `http_request`.
    #[serde(rename = "type", default = "unknown_kind", deserialize_with = "kind")]
    pub kind: String,

    /// When the event happened, in fractional unix seconds.
    #[serde(default, deserialize_with = "lenient::f64")]
    pub timestamp: f64,

    /// Event payload.
    #[serde(default)]
    pub payload: Payload,

    /// Ordered trace segments.
    #[serde(default)]
    pub segments: Vec<Segment>,
}

fn kind<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient::opt_string(d)?.unwrap_or_else(unknown_kind))
}

impl Event {
    /// Creates an event with an empty payload and no segments.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>, timestamp: f64) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            timestamp,
            payload: Payload::default(),
            segments: Vec::new(),
        }
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Appends a segment.
    #[must_use]
    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Returns true if this event records an HTTP request.
    #[must_use]
    pub fn is_http_request(&self) -> bool {
        self.kind == HTTP_REQUEST
    }

    /// Total duration across the segments that declare one.
    ///
    /// Returns `None` when no segment declares a duration.
    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        self.segments
            .iter()
            .filter_map(|s| s.payload.duration)
            .fold(None, |acc, d| Some(acc.unwrap_or(0.0) + d))
    }
}
