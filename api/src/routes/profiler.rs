//! Profiler endpoint.
//!
//! Lists recently recorded events with statistics over the whole history.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shared::insights::ProfilerSection;
use validator::Validate;

use super::{query_rejected, run_blocking, validation_failed, ApiRejection};
use crate::state::AppState;

fn default_limit() -> usize {
    50
}

/// Query parameters for the profiler.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfilerParams {
    /// Maximum number of events.
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1_000))]
    pub limit: usize,
    /// Only events of this kind.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Creates the profiler routes.
pub fn profiler_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/profiler", get(get_profiler))
        .with_state(state)
}

async fn get_profiler(
    State(state): State<AppState>,
    params: Result<Query<ProfilerParams>, QueryRejection>,
) -> Result<Json<ProfilerSection>, ApiRejection> {
    let Query(params) = params.map_err(|r| query_rejected(&r))?;
    params.validate().map_err(|e| validation_failed(&e))?;

    let kind = params.kind.filter(|k| !k.is_empty());
    let section = run_blocking(&state, move |collector| {
        collector.profiler(kind.as_deref(), params.limit)
    })
    .await?;

    Ok(Json(section))
}
