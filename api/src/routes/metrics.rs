//! Metrics endpoint.
//!
//! Serves the runtime, application and memory metrics of the monitored server.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::telemetry::MetricsReport;

use super::{run_blocking, ApiRejection};
use crate::state::AppState;

/// Metrics with the time they were computed.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    /// The metrics.
    #[serde(flatten)]
    pub report: MetricsReport,
    /// Unix time in seconds, with millisecond precision.
    pub timestamp: f64,
}

/// Creates the metrics routes.
pub fn metrics_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/metrics", get(get_metrics))
        .with_state(state)
}

#[allow(clippy::cast_precision_loss)]
async fn get_metrics(
    State(state): State<AppState>,
) -> Result<Json<MetricsResponse>, ApiRejection> {
    let report = run_blocking(&state, |collector| collector.metrics()).await?;

    Ok(Json(MetricsResponse {
        report,
        timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
    }))
}
