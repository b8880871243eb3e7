//! API route definitions.
//!
//! This module organizes all HTTP routes for the devscope API server.
//!
//! Every handler reads files or walks the event history, so the work runs on the
//! blocking thread pool through [`run_blocking`].

mod health;
mod insights;
mod logs;
mod metrics;
mod profiler;

pub use health::health_routes;
pub use insights::insights_routes;
pub use logs::logs_routes;
pub use metrics::metrics_routes;
pub use profiler::profiler_routes;

use axum::{extract::rejection::QueryRejection, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::insights::InsightsCollector;
use std::sync::Arc;
use validator::ValidationErrors;

use crate::state::AppState;

/// Error response shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

/// Rejection returned by handlers.
pub type ApiRejection = (StatusCode, Json<ApiError>);

/// 400 for query strings that cannot be parsed.
pub fn query_rejected(rejection: &QueryRejection) -> ApiRejection {
    invalid_parameters(rejection.body_text())
}

/// 400 for query parameters outside their allowed range.
pub fn validation_failed(errors: &ValidationErrors) -> ApiRejection {
    invalid_parameters(errors.to_string())
}

fn invalid_parameters(message: String) -> ApiRejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: "invalid_parameters".to_string(),
            message,
        }),
    )
}

/// 500 for failures while producing a response.
pub fn internal_error(message: impl ToString) -> ApiRejection {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: "internal_error".to_string(),
            message: message.to_string(),
        }),
    )
}

/// Runs `f` against the collector on the blocking thread pool.
///
/// # Errors
///
/// Returns a 500 rejection if the task panics or is cancelled.
pub async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiRejection>
where
    T: Send + 'static,
    F: FnOnce(&InsightsCollector) -> T + Send + 'static,
{
    let collector: Arc<InsightsCollector> = state.collector();
    tokio::task::spawn_blocking(move || f(&collector))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Request task failed");
            internal_error(e)
        })
}
