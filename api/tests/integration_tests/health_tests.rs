//! Integration tests for health check and general API functionality.
//!
//! Tests cover:
//! - Health check endpoint
//! - Empty `var` directory behavior
//! - Unknown routes

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _server) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "devscope-api");
}

#[tokio::test]
async fn test_empty_var_dir_returns_empty_results() {
    let (app, _server) = test_app();

    // No log files yet
    let (status, response) = get(app.clone(), "/api/v1/logs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_lines"], 0);
    assert_eq!(response["current_file"], "error.log");
    assert!(response["files"].as_array().unwrap().is_empty());

    // No stats files yet
    let (status, response) = get(app.clone(), "/api/v1/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["application"]["requests"]["total"], 0);

    // No recorded events yet
    let (status, response) = get(app, "/api/v1/profiler").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total"], 0);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _server) = test_app();

    let (status, _) = get(app, "/api/v1/traces").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
