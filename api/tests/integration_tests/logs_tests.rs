//! Integration tests for log viewing.
//!
//! Tests cover:
//! - Tailing the newest or a selected file
//! - Substring filters, including ones needing URL encoding
//! - Merging recent lines across files
//! - Parameter validation

use axum::http::StatusCode;

use super::common::{get, test_app};

const OLDER: &str = "\
[2024-03-01 08:00:00] INFO worker booted
[2024-03-01 08:00:01] DEBUG cache warmed
";

const NEWER: &str = "\
[2024-03-02 12:00:00] INFO request handled
[2024-03-02 12:00:01] WARNING slow query in /app/src/Repo.php:42
[2024-03-02 12:00:02] ERROR payment failed: card declined
";

#[tokio::test]
async fn test_tail_lists_files_newest_first() {
    let (app, server) = test_app();
    server.write_log("2024-03-01.log", OLDER);
    server.write_log("2024-03-02.log", NEWER);
    server.write_log("notes.txt", "not a log\n");

    let (status, response) = get(app, "/api/v1/logs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["current_file"], "2024-03-02.log");
    assert_eq!(response["files"][0], "2024-03-02.log");
    assert_eq!(response["files"][1], "2024-03-01.log");
    assert_eq!(response["files"].as_array().unwrap().len(), 2);
    assert_eq!(response["total_lines"], 3);
}

#[tokio::test]
async fn test_tail_selected_file_keeps_last_lines() {
    let (app, server) = test_app();
    server.write_log("2024-03-01.log", OLDER);
    server.write_log("2024-03-02.log", NEWER);

    let (status, response) = get(app, "/api/v1/logs?file=2024-03-02.log&lines=2").await;
    assert_eq!(status, StatusCode::OK);

    let logs = response["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["timestamp"], "2024-03-02 12:00:01");
    assert_eq!(logs[1]["line"], "[2024-03-02 12:00:02] ERROR payment failed: card declined");
}

#[tokio::test]
async fn test_tail_does_not_read_outside_log_dir() {
    let (app, server) = test_app();
    server.write_log("2024-03-02.log", NEWER);
    server.write_app_stats(&serde_json::json!({"requests": 1}));

    let (status, response) = get(app, "/api/v1/logs?file=../server-stats-devscope.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_lines"], 0);
    assert_eq!(response["current_file"], "../server-stats-devscope.json");
}

#[tokio::test]
async fn test_filter_with_spaces() {
    let (app, server) = test_app();
    server.write_log("2024-03-02.log", NEWER);

    let uri = format!(
        "/api/v1/logs/recent?filter={}",
        urlencoding::encode("card declined")
    );
    let (status, response) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_lines"], 1);
    assert_eq!(response["recent"][0]["level"], "ERROR");
    assert_eq!(response["recent"][0]["message"], "payment failed: card declined");
}

#[tokio::test]
async fn test_recent_merges_files_by_timestamp() {
    let (app, server) = test_app();
    server.write_log("2024-03-01.log", OLDER);
    server.write_log("2024-03-02.log", NEWER);

    let (status, response) = get(app, "/api/v1/logs/recent?lines=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_lines"], 5);

    let recent = response["recent"].as_array().unwrap();
    assert_eq!(recent[0]["timestamp"], "2024-03-02 12:00:02");
    assert_eq!(recent[4]["timestamp"], "2024-03-01 08:00:00");
    assert_eq!(recent[4]["file"], "2024-03-01.log");

    let warning = &recent[1];
    assert_eq!(warning["level"], "WARNING");
    assert_eq!(warning["context"]["file"], "/app/src/Repo.php");
    assert_eq!(warning["context"]["line"], 42);
}

#[tokio::test]
async fn test_zero_lines_returns_empty() {
    let (app, server) = test_app();
    server.write_log("2024-03-01.log", OLDER);
    server.write_log("2024-03-02.log", NEWER);

    let (status, response) = get(app.clone(), "/api/v1/logs?lines=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_lines"], 0);
    assert!(response["logs"].as_array().unwrap().is_empty());
    assert_eq!(response["files"].as_array().unwrap().len(), 2);

    let (status, response) = get(app, "/api/v1/logs/recent?lines=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_lines"], 0);
    assert!(response["recent"].as_array().unwrap().is_empty());
    assert_eq!(response["files"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_parameters_are_rejected() {
    let (app, _server) = test_app();

    for uri in [
        "/api/v1/logs?lines=20000",
        "/api/v1/logs?lines=abc",
        "/api/v1/logs/recent?lines=10001",
    ] {
        let (status, response) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response["error"], "invalid_parameters");
        assert!(response["message"].is_string());
    }
}
