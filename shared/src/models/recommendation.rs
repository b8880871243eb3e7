//! Advisory findings produced by evaluating telemetry against thresholds.

use serde::{Deserialize, Serialize};

/// Severity of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    /// Something is trending toward a problem.
    Warning,
    /// Something is already failing.
    Error,
}

/// A single advisory finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Severity.
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    /// Area the finding concerns, e.g. `memory`.
    pub category: String,
    /// What was observed.
    pub message: String,
    /// Suggested next step.
    pub action: String,
}

impl Recommendation {
    /// Creates a warning.
    #[must_use]
    pub fn warning(
        category: impl Into<String>,
        message: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            kind: RecommendationKind::Warning,
            category: category.into(),
            message: message.into(),
            action: action.into(),
        }
    }

    /// Creates an error.
    #[must_use]
    pub fn error(
        category: impl Into<String>,
        message: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            kind: RecommendationKind::Error,
            category: category.into(),
            message: message.into(),
            action: action.into(),
        }
    }
}
