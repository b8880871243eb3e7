//! Integration tests for the dashboard report and recommendations.
//!
//! Tests cover:
//! - The full report assembled from logs, stats files and history
//! - Failed requests with database context
//! - Recommendation thresholds

use axum::http::StatusCode;
use serde_json::json;
use shared::models::{Event, Payload, Segment};

use super::common::{get, test_app, test_app_with};

#[tokio::test]
async fn test_full_report() {
    let (app, server) = test_app_with(|config| config.with_app_name("Shop API"));
    server.write_log(
        "app.log",
        "[2024-05-01 10:00:00] INFO checkout started\n[2024-05-01 10:00:01] ERROR checkout failed\n",
    );
    std::fs::write(
        server.var_dir.path().join("server-stats-shop-api.json"),
        json!({"uptime": 90, "requests": 3, "errors": 1}).to_string(),
    )
    .unwrap();

    server.record(
        Event::new("r1", "http_request", 10.0).with_payload(Payload {
            method: Some("POST".to_string()),
            path: Some("/checkout".to_string()),
            status: Some(201),
            duration: Some(42.0),
            ..Payload::default()
        }),
    );
    server.record(
        Event::new("r2", "http_request", 20.0)
            .with_payload(Payload {
                path: Some("/orders".to_string()),
                status: Some(500),
                error: Some(json!("SQLSTATE[23000]: Integrity constraint violation")),
                ..Payload::default()
            })
            .with_segment(Segment::new(
                "database_query",
                20.1,
                Payload {
                    query: Some(json!("INSERT INTO orders VALUES (?)")),
                    params: Some(json!([7])),
                    ..Payload::default()
                },
            )),
    );
    let recorded = tokio_test::assert_ok!(server.history.len());
    assert_eq!(recorded, 2);

    let (status, report) = get(app, "/api/v1/insights").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(report["meta"]["server"]["name"], "Shop API");
    assert_eq!(report["meta"]["server"]["uptime"], 90);
    assert_eq!(report["meta"]["server"]["environment"], "development");

    let requests = report["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["id"], "r2");
    assert_eq!(requests[0]["method"], "GET");
    assert_eq!(requests[1]["method"], "POST");
    assert_eq!(requests[1]["status"], 201);

    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["error"]["code"], "23000");
    assert_eq!(errors[0]["error"]["context"]["query"], "INSERT INTO orders VALUES (?)");
    assert_eq!(errors[0]["error"]["context"]["params"], json!([7]));

    assert_eq!(report["logs"]["total_lines"], 2);
    assert_eq!(report["logs"]["recent"][0]["message"], "checkout failed");
    assert_eq!(report["profiler"]["total"], 2);

    let findings = report["recommendations"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["type"], "error");
    assert_eq!(findings[0]["message"], "High error rate: 33.3%");
}

#[tokio::test]
async fn test_memory_recommendation() {
    let (app, server) = test_app_with(|config| config.with_memory_limit("1M"));
    server.write_runtime_stats(&json!({"memory_total": 943_718}));

    let (status, response) = get(app, "/api/v1/recommendations").await;
    assert_eq!(status, StatusCode::OK);

    let findings = response["recommendations"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["type"], "warning");
    assert_eq!(findings[0]["category"], "memory");
    assert_eq!(findings[0]["message"], "Memory usage is high: 90.0%");
}

#[tokio::test]
async fn test_healthy_server_has_no_recommendations() {
    let (app, server) = test_app();
    server.write_app_stats(&json!({"requests": 1000, "errors": 50}));
    server.write_runtime_stats(&json!({"memory_total": 1_048_576}));

    let (status, response) = get(app, "/api/v1/recommendations").await;
    assert_eq!(status, StatusCode::OK);
    assert!(response["recommendations"].as_array().unwrap().is_empty());
}
