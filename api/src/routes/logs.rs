//! Log viewing endpoints.
//!
//! `/api/v1/logs` tails a single log file for the file viewer, while
//! `/api/v1/logs/recent` merges the newest parsed lines of every log file.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shared::insights::LogsSection;
use shared::logs::FileTail;
use validator::Validate;

use super::{query_rejected, run_blocking, validation_failed, ApiRejection};
use crate::state::AppState;

const DEFAULT_LINES: usize = 100;

fn default_lines() -> usize {
    DEFAULT_LINES
}

/// Query parameters for the file viewer.
#[derive(Debug, Deserialize, Validate)]
pub struct FileTailParams {
    /// Log file name; defaults to the newest file.
    pub file: Option<String>,
    /// Maximum number of lines.
    #[serde(default = "default_lines")]
    #[validate(range(max = 10_000))]
    pub lines: usize,
    /// Substring lines must contain.
    pub filter: Option<String>,
}

/// Query parameters for the merged recent lines.
#[derive(Debug, Deserialize, Validate)]
pub struct RecentLogsParams {
    /// Maximum number of lines.
    #[serde(default = "default_lines")]
    #[validate(range(max = 10_000))]
    pub lines: usize,
    /// Substring lines must contain.
    pub filter: Option<String>,
}

/// Creates the log viewing routes.
pub fn logs_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/logs", get(tail_log_file))
        .route("/api/v1/logs/recent", get(recent_logs))
        .with_state(state)
}

fn non_empty(filter: Option<String>) -> Option<String> {
    filter.filter(|f| !f.is_empty())
}

async fn tail_log_file(
    State(state): State<AppState>,
    params: Result<Query<FileTailParams>, QueryRejection>,
) -> Result<Json<FileTail>, ApiRejection> {
    let Query(params) = params.map_err(|r| query_rejected(&r))?;
    params.validate().map_err(|e| validation_failed(&e))?;

    let filter = non_empty(params.filter);
    let tail = run_blocking(&state, move |collector| {
        collector
            .aggregator()
            .tail_file(params.file.as_deref(), params.lines, filter.as_deref())
    })
    .await?;

    tracing::debug!(file = %tail.current_file, lines = tail.total_lines, "Served log tail");
    Ok(Json(tail))
}

async fn recent_logs(
    State(state): State<AppState>,
    params: Result<Query<RecentLogsParams>, QueryRejection>,
) -> Result<Json<LogsSection>, ApiRejection> {
    let Query(params) = params.map_err(|r| query_rejected(&r))?;
    params.validate().map_err(|e| validation_failed(&e))?;

    let filter = non_empty(params.filter);
    let section = run_blocking(&state, move |collector| {
        collector.search_logs(params.lines, filter.as_deref())
    })
    .await?;

    Ok(Json(section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use shared::config::DevToolsConfig;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn var_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("log")).unwrap();
        fs::write(
            dir.path().join("log/2024-01-01.log"),
            "[2024-01-01 09:00:00] INFO boot\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("log/2024-01-02.log"),
            "[2024-01-02 10:00:00] INFO ready\n[2024-01-02 10:00:05] ERROR disk full\n",
        )
        .unwrap();
        dir
    }

    async fn get(dir: &TempDir, uri: &str) -> (StatusCode, Value) {
        let state = AppState::from_config(DevToolsConfig::new(dir.path())).unwrap();
        let response = logs_routes(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_tail_defaults_to_newest_file() {
        let dir = var_dir();
        let (status, body) = get(&dir, "/api/v1/logs").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_file"], "2024-01-02.log");
        assert_eq!(body["total_lines"], 2);
        assert_eq!(body["logs"][1]["line"], "[2024-01-02 10:00:05] ERROR disk full");
        assert_eq!(body["logs"][1]["timestamp"], "2024-01-02 10:00:05");
        assert_eq!(body["files"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_tail_selected_file_with_filter() {
        let dir = var_dir();
        let (status, body) = get(&dir, "/api/v1/logs?file=2024-01-02.log&filter=ERROR").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_lines"], 1);
    }

    #[tokio::test]
    async fn test_tail_zero_lines_is_empty() {
        let dir = var_dir();
        let (status, body) = get(&dir, "/api/v1/logs?lines=0").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_lines"], 0);
        assert!(body["logs"].as_array().unwrap().is_empty());
        assert_eq!(body["current_file"], "2024-01-02.log");
    }

    #[tokio::test]
    async fn test_tail_rejects_out_of_range_lines() {
        let dir = var_dir();

        let (status, body) = get(&dir, "/api/v1/logs?lines=10001").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_parameters");

        let (status, body) = get(&dir, "/api/v1/logs?lines=many").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_parameters");
    }

    #[tokio::test]
    async fn test_recent_merges_all_files() {
        let dir = var_dir();
        let (status, body) = get(&dir, "/api/v1/logs/recent?lines=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_lines"], 2);
        assert_eq!(body["recent"][0]["message"], "disk full");
        assert_eq!(body["recent"][0]["level"], "ERROR");
        assert_eq!(body["recent"][1]["file"], "2024-01-02.log");
    }
}
