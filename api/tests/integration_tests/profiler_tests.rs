//! Integration tests for the profiler endpoint.
//!
//! Tests cover:
//! - Newest-first listing with type filter and limit
//! - Statistics over the whole history
//! - Segment durations

use axum::http::StatusCode;
use serde_json::json;
use shared::models::{Event, Payload, Segment};

use super::common::{get, test_app, TestServer};

fn record_sample(server: &TestServer) {
    server.record(
        Event::new("req-1", "http_request", 1_700_000_000.0)
            .with_payload(Payload::with_duration(20.0))
            .with_segment(Segment::new("db", 1_700_000_000.1, Payload::with_duration(5.0)))
            .with_segment(Segment::new("cache", 1_700_000_000.2, Payload::with_duration(1.5))),
    );
    server.record(Event::new("job-1", "job", 1_700_000_001.0).with_payload(Payload::with_duration(40.0)));
    server.record(Event::new("req-2", "http_request", 1_700_000_002.0));
}

#[tokio::test]
async fn test_profiler_lists_events_newest_first() {
    let (app, server) = test_app();
    record_sample(&server);

    let (status, response) = get(app, "/api/v1/profiler").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total"], 3);

    let events = response["events"].as_array().unwrap();
    assert_eq!(events[0]["id"], "req-2");
    assert_eq!(events[2]["id"], "req-1");
    assert_eq!(events[2]["type"], "http_request");
    assert_eq!(events[2]["time"], "2023-11-14 22:13:20.000");
    assert_eq!(events[2]["duration"], 6.5);
    assert_eq!(events[2]["segments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_profiler_statistics() {
    let (app, server) = test_app();
    record_sample(&server);

    let (_, response) = get(app, "/api/v1/profiler?type=job").await;

    let events = response["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], "job-1");

    // Statistics always cover the whole history
    assert_eq!(
        response["statistics"]["counts_by_type"],
        json!({"http_request": 2, "job": 1})
    );
    assert_eq!(response["statistics"]["total_events"], 3);
}

#[tokio::test]
async fn test_profiler_limit() {
    let (app, server) = test_app();
    record_sample(&server);

    let (status, response) = get(app.clone(), "/api/v1/profiler?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["events"].as_array().unwrap().len(), 2);

    let (status, response) = get(app, "/api/v1/profiler?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_parameters");
}
