//! Dashboard report endpoints.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use shared::insights::InsightsReport;
use shared::models::Recommendation;

use super::{run_blocking, ApiRejection};
use crate::state::AppState;

/// Advisory findings.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    /// Findings in evaluation order.
    pub recommendations: Vec<Recommendation>,
}

/// Creates the report routes.
pub fn insights_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/insights", get(get_insights))
        .route("/api/v1/recommendations", get(get_recommendations))
        .with_state(state)
}

async fn get_insights(State(state): State<AppState>) -> Result<Json<InsightsReport>, ApiRejection> {
    let report = run_blocking(&state, |collector| collector.collect()).await?;

    tracing::debug!(
        requests = report.requests.len(),
        errors = report.errors.len(),
        findings = report.recommendations.len(),
        "Collected insights report"
    );
    Ok(Json(report))
}

async fn get_recommendations(
    State(state): State<AppState>,
) -> Result<Json<RecommendationsResponse>, ApiRejection> {
    let recommendations = run_blocking(&state, |collector| collector.recommendations()).await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}
