//! Integration tests for the metrics endpoint.
//!
//! Tests cover:
//! - Metrics derived from both stats files
//! - Average response time from the event history
//! - Unreadable stats files

use axum::http::StatusCode;
use serde_json::json;
use shared::models::{Event, Payload};

use super::common::{get, test_app, test_app_with};

#[tokio::test]
async fn test_metrics_from_stats_files() {
    let (app, server) = test_app_with(|config| config.with_worker_num(8).with_memory_limit("128M"));
    server.write_app_stats(&json!({"uptime": 3_725, "requests": 200, "errors": 8}));
    server.write_runtime_stats(&json!({
        "connection_num": 12,
        "worker_num": 6,
        "idle_worker_num": 2,
        "request_count": 7_450,
        "coroutine_num": 40,
        "memory_total": 1_572_864,
        "memory_peak": 2_097_152
    }));

    let (status, response) = get(app, "/api/v1/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let runtime = &response["runtime"];
    assert_eq!(runtime["connections"]["active"], 12);
    assert_eq!(runtime["workers"]["active"], 6);
    assert_eq!(runtime["workers"]["idle"], 2);
    assert_eq!(runtime["workers"]["total"], 8);
    assert_eq!(runtime["requests"]["per_second"], 2.0);
    assert_eq!(runtime["coroutines"]["active"], 40);

    let application = &response["application"];
    assert_eq!(application["requests"]["success"], 192);
    assert_eq!(application["uptime"]["seconds"], 3_725);
    assert_eq!(application["uptime"]["formatted"], "1h 2m 5s");

    let memory = &response["memory"];
    assert_eq!(memory["current"]["formatted"], "1.5 MB");
    assert_eq!(memory["peak"]["formatted"], "2 MB");
    assert_eq!(memory["limit"]["bytes"], 134_217_728);
    assert!(response["timestamp"].is_f64());
}

#[tokio::test]
async fn test_average_response_time_from_history() {
    let (app, server) = test_app();
    server.record(Event::new("a", "http_request", 1.0).with_payload(Payload::with_duration(12.5)));
    server.record(Event::new("b", "http_request", 2.0).with_payload(Payload::with_duration(7.5)));
    server.record(Event::new("c", "job", 3.0).with_payload(Payload::with_duration(500.0)));

    let (status, response) = get(app, "/api/v1/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["application"]["average_response_time"], 10.0);
}

#[tokio::test]
async fn test_corrupt_stats_files_fall_back_to_zero() {
    let (app, server) = test_app();
    std::fs::write(
        server.var_dir.path().join("server-stats-devscope.json"),
        "{not json",
    )
    .unwrap();

    let (status, response) = get(app, "/api/v1/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["application"]["requests"]["total"], 0);
    assert_eq!(response["application"]["uptime"]["formatted"], "0s");
}
