//! Read-only queries over a snapshot of the event history.

use chrono::DateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::provider::EventHistoryProvider;
use crate::models::{Event, Payload, Segment};
use crate::ordering::top_n_by_timestamp_desc;
use crate::telemetry::{average_response_time_ms, round2};

static SQLSTATE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SQLSTATE\[([^\]]+)\]").expect("sqlstate pattern is valid"));

static HTTP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"HTTP (\d+)").expect("http status pattern is valid"));

/// Aggregate figures over the whole history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStatistics {
    /// Number of events.
    pub total_events: usize,
    /// Number of events per kind.
    pub counts_by_type: BTreeMap<String, usize>,
    /// Mean duration of the events that have one, rounded to 2 decimals.
    pub average_duration_ms: f64,
    /// Total duration of the events that have one, rounded to 2 decimals.
    pub total_duration_ms: f64,
}

/// An event prepared for the profiler listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfiledEvent {
    /// Event identifier.
    pub id: String,
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Unix seconds.
    pub timestamp: f64,
    /// `YYYY-MM-DD HH:MM:SS.mmm` in UTC.
    pub time: Option<String>,
    /// Event payload.
    pub payload: Payload,
    /// Trace segments.
    pub segments: Vec<Segment>,
    /// Sum of segment durations.
    pub duration: Option<f64>,
}

/// Request and response headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestHeaders {
    /// Request headers.
    pub request: Value,
    /// Response headers.
    pub response: Value,
}

/// An HTTP request prepared for the request listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSummary {
    /// Event identifier.
    pub id: String,
    /// Unix seconds.
    pub timestamp: f64,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status.
    pub status: u16,
    /// Request duration in milliseconds.
    pub duration_ms: f64,
    /// Memory used in bytes.
    pub memory_bytes: u64,
    /// Headers.
    pub headers: RequestHeaders,
    /// Query parameters.
    pub query: Value,
    /// Trace segments.
    pub segments: Vec<Segment>,
}

/// Database statement involved in a failed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// SQL text of the last database segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Bound parameters of the last database segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// What went wrong in a failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error message.
    pub message: String,
    /// Code found in the message (`SQLSTATE[...]` or `HTTP <n>`).
    pub code: Option<String>,
    /// Source file.
    pub file: Option<String>,
    /// Source line.
    pub line: Option<u32>,
    /// Stack frames.
    pub trace: Vec<Value>,
    /// Related database statement.
    pub context: ErrorContext,
}

/// A failed HTTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Event identifier.
    pub id: String,
    /// Unix seconds.
    pub timestamp: f64,
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status.
    pub status: u16,
    /// Request duration in milliseconds.
    pub duration_ms: f64,
    /// Error details.
    pub error: ErrorDetails,
}

/// A loaded snapshot of the event history.
///
/// Every listing is newest-first; ties keep the provider's order.
///
/// # Example
///
/// ```
/// use shared::history::{EventHistoryView, InMemoryEventHistory};
/// use shared::models::Event;
///
/// let history = InMemoryEventHistory::new(100);
/// history.record(Event::new("a", "http_request", 1.0)).unwrap();
/// history.record(Event::new("b", "cache", 2.0)).unwrap();
///
/// let view = EventHistoryView::load(Some(&history));
/// assert_eq!(view.recent(None, 10)[0].id, "b");
/// assert_eq!(view.statistics().total_events, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventHistoryView {
    events: Vec<Event>,
}

impl EventHistoryView {
    /// Loads the history from `provider`.
    ///
    /// No provider, or a failing one, gives an empty view.
    #[must_use]
    pub fn load(provider: Option<&dyn EventHistoryProvider>) -> Self {
        let events = match provider.map(|p| p.history()) {
            Some(Ok(events)) => events,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Event history unavailable");
                Vec::new()
            }
            None => Vec::new(),
        };
        Self { events }
    }

    /// Wraps already loaded events.
    #[must_use]
    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// All loaded events, in provider order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The newest `max_events` events, optionally of one kind only.
    #[must_use]
    pub fn recent(&self, kind: Option<&str>, max_events: usize) -> Vec<Event> {
        let matching = self
            .events
            .iter()
            .filter(|e| kind.map_or(true, |wanted| wanted == e.kind))
            .collect();
        top_n_by_timestamp_desc(matching, max_events)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Counts and durations over every loaded event.
    ///
    /// Events without a duration are counted but excluded from the averages.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn statistics(&self) -> HistoryStatistics {
        let mut counts_by_type = BTreeMap::new();
        let mut total_duration = 0.0;
        let mut timed_events = 0_usize;

        for event in &self.events {
            *counts_by_type.entry(event.kind.clone()).or_insert(0) += 1;
            if let Some(duration) = event.duration() {
                total_duration += duration;
                timed_events += 1;
            }
        }

        let average_duration_ms = if timed_events > 0 {
            round2(total_duration / timed_events as f64)
        } else {
            0.0
        };

        HistoryStatistics {
            total_events: self.events.len(),
            counts_by_type,
            average_duration_ms,
            total_duration_ms: round2(total_duration),
        }
    }

    /// The newest `limit` events prepared for the profiler listing.
    #[must_use]
    pub fn profiler_events(&self, kind: Option<&str>, limit: usize) -> Vec<ProfiledEvent> {
        self.recent(kind, limit)
            .into_iter()
            .map(|event| ProfiledEvent {
                time: format_event_time(event.timestamp),
                duration: event.duration(),
                id: event.id,
                kind: event.kind,
                timestamp: event.timestamp,
                payload: event.payload,
                segments: event.segments,
            })
            .collect()
    }

    /// The newest `limit` HTTP requests.
    #[must_use]
    pub fn requests(&self, limit: usize) -> Vec<RequestSummary> {
        self.http_requests()
            .into_iter()
            .take(limit)
            .map(|event| {
                let payload = &event.payload;
                RequestSummary {
                    id: event.id.clone(),
                    timestamp: event.timestamp,
                    method: payload.method.clone().unwrap_or_else(|| "GET".to_string()),
                    path: payload.path.clone().unwrap_or_else(|| "/".to_string()),
                    status: payload.status.unwrap_or(200),
                    duration_ms: payload.duration.unwrap_or(0.0),
                    memory_bytes: payload.memory.unwrap_or(0),
                    headers: RequestHeaders {
                        request: payload.request_headers.clone().unwrap_or_else(empty_list),
                        response: payload.response_headers.clone().unwrap_or_else(empty_list),
                    },
                    query: payload.query.clone().unwrap_or_else(empty_list),
                    segments: event.segments.clone(),
                }
            })
            .collect()
    }

    /// Every HTTP request that ended with status 400 or above, newest first.
    #[must_use]
    pub fn errors(&self) -> Vec<ErrorReport> {
        self.http_requests()
            .into_iter()
            .filter(|e| e.payload.status.unwrap_or(200) >= 400)
            .map(error_report)
            .collect()
    }

    /// Mean duration of HTTP requests, rounded to 2 decimals.
    #[must_use]
    pub fn average_response_time_ms(&self) -> f64 {
        average_response_time_ms(&self.events)
    }

    fn http_requests(&self) -> Vec<&Event> {
        let requests = self.events.iter().filter(|e| e.is_http_request()).collect();
        top_n_by_timestamp_desc(requests, usize::MAX)
    }
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

/// Renders unix seconds as `YYYY-MM-DD HH:MM:SS.mmm` in UTC.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_event_time(timestamp: f64) -> Option<String> {
    if !timestamp.is_finite() {
        return None;
    }
    let millis = (timestamp * 1000.0).floor();
    if millis.abs() > 8.0e15 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
}

/// Extracts an error code from an error message.
#[must_use]
pub fn extract_error_code(message: &str) -> Option<String> {
    SQLSTATE_CODE
        .captures(message)
        .or_else(|| HTTP_CODE.captures(message))
        .map(|caps| caps[1].to_string())
}

fn error_report(event: &Event) -> ErrorReport {
    let payload = &event.payload;
    let status = payload.status.unwrap_or(500);

    let mut message = None;
    let mut file = None;
    let mut line = None;
    let mut trace = None;

    match &payload.error {
        Some(Value::Object(error)) => {
            message = error.get("message").and_then(value_text);
            file = error.get("file").and_then(value_text);
            line = error
                .get("line")
                .and_then(Value::as_u64)
                .and_then(|l| u32::try_from(l).ok());
            trace = error.get("trace").cloned();
        }
        Some(other) => message = value_text(other),
        None => {}
    }

    for segment in event
        .segments
        .iter()
        .filter(|s| s.kind == "error" || s.kind == "exception")
    {
        let p = &segment.payload;
        message = message.or_else(|| p.message.clone().filter(|m| !m.is_empty()));
        file = file.or_else(|| p.file.clone().filter(|f| !f.is_empty()));
        line = line.or(p.line.filter(|&l| l > 0));
        if is_blank(trace.as_ref()) && p.trace.is_some() {
            trace.clone_from(&p.trace);
        }
    }

    let message = message.unwrap_or_else(|| format!("HTTP {status} Error"));

    ErrorReport {
        id: event.id.clone(),
        timestamp: event.timestamp,
        kind: event.kind.clone(),
        method: payload.method.clone().unwrap_or_else(|| "GET".to_string()),
        path: payload.path.clone().unwrap_or_else(|| "/".to_string()),
        status,
        duration_ms: payload.duration.unwrap_or(0.0),
        error: ErrorDetails {
            code: extract_error_code(&message),
            message,
            file,
            line,
            trace: trace.map(normalize_trace).unwrap_or_default(),
            context: error_context(&event.segments),
        },
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Normalizes a recorded stack trace into a list of frames.
///
/// Frames that are already objects with a `file` key are kept as is. String frames,
/// and the lines of a trace recorded as one string, become `{"line": ...}` objects.
/// Anything else yields no frames.
#[must_use]
pub fn normalize_trace(trace: Value) -> Vec<Value> {
    match trace {
        Value::Array(frames) => match frames.first() {
            Some(Value::Object(frame)) if frame.contains_key("file") => frames,
            Some(Value::String(_)) => frames
                .into_iter()
                .map(|frame| json!({ "line": frame }))
                .collect(),
            _ => Vec::new(),
        },
        Value::String(text) => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| json!({ "line": l }))
            .collect(),
        _ => Vec::new(),
    }
}

fn error_context(segments: &[Segment]) -> ErrorContext {
    let mut context = ErrorContext::default();
    for segment in segments.iter().filter(|s| s.kind == "database_query") {
        if let Some(query) = &segment.payload.query {
            context.query = Some(query.clone());
        }
        if let Some(params) = &segment.payload.params {
            context.params = Some(params.clone());
        }
    }
    context
}
