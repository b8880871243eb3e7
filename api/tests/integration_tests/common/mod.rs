//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including a throwaway `var` directory for the monitored server and HTTP request
//! helpers.

#![allow(dead_code)]

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::config::DevToolsConfig;
use shared::history::InMemoryEventHistory;
use shared::models::Event;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// The monitored server's files and event history behind a test router.
pub struct TestServer {
    /// Holds the stats files and `log/`; removed on drop.
    pub var_dir: TempDir,
    /// Event history attached to the router.
    pub history: Arc<InMemoryEventHistory>,
}

impl TestServer {
    /// Writes a log file into `log/`.
    pub fn write_log(&self, name: &str, content: &str) {
        fs::write(self.var_dir.path().join("log").join(name), content).unwrap();
    }

    /// Writes the application stats file.
    pub fn write_app_stats(&self, stats: &Value) {
        fs::write(
            self.var_dir.path().join("server-stats-devscope.json"),
            stats.to_string(),
        )
        .unwrap();
    }

    /// Writes the runtime stats file.
    pub fn write_runtime_stats(&self, stats: &Value) {
        fs::write(
            self.var_dir.path().join("runtime-stats-devscope.json"),
            stats.to_string(),
        )
        .unwrap();
    }

    /// Appends an event to the history.
    pub fn record(&self, event: Event) {
        self.history.record(event).unwrap();
    }
}

/// Creates a test router over an empty `var` directory and a fresh history.
///
/// # Returns
///
/// A tuple containing the configured router and the server fixture. Files written
/// through the fixture are visible to the router immediately.
pub fn test_app() -> (Router, TestServer) {
    test_app_with(|config| config)
}

/// Like [`test_app`], adjusting the configuration first.
pub fn test_app_with(configure: impl FnOnce(DevToolsConfig) -> DevToolsConfig) -> (Router, TestServer) {
    let var_dir = TempDir::new().unwrap();
    fs::create_dir(var_dir.path().join("log")).unwrap();
    let history = Arc::new(InMemoryEventHistory::new(1000));

    let config = configure(DevToolsConfig::new(var_dir.path()));
    let state = AppState::from_config(config)
        .unwrap()
        .with_event_history(history.clone());

    (create_router(state), TestServer { var_dir, history })
}

/// Helper to make a GET request.
///
/// # Arguments
///
/// * `app` - The Axum router to send the request to
/// * `uri` - The URI path to GET from
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}
