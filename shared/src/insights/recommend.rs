//! Threshold checks that turn telemetry into advisory findings.

use crate::history::SyncStatus;
use crate::models::Recommendation;
use crate::telemetry::TelemetrySnapshot;

/// Memory usage, as a percentage of the limit, above which a warning is raised.
pub const MEMORY_THRESHOLD_PERCENT: f64 = 80.0;

/// Error rate percentage above which an error is raised.
pub const ERROR_RATE_THRESHOLD_PERCENT: f64 = 5.0;

/// Evaluates telemetry against fixed thresholds.
///
/// Findings come out in a fixed order: memory, error rate, synchronization.
///
/// # Example
///
/// ```
/// use shared::insights::RecommendationEngine;
/// use shared::telemetry::TelemetrySnapshot;
///
/// let findings = RecommendationEngine.evaluate(&TelemetrySnapshot::default(), 1000, 900, None);
/// assert_eq!(findings.len(), 1);
/// assert_eq!(findings[0].message, "Memory usage is high: 90.0%");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Produces the findings for one snapshot.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - Current telemetry
    /// * `memory_limit_bytes` - Memory limit; 0 disables the memory check
    /// * `memory_current_bytes` - Current memory usage; 0 disables the memory check
    /// * `sync` - Status reported by a synchronization collaborator, if any
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(
        self,
        snapshot: &TelemetrySnapshot,
        memory_limit_bytes: u64,
        memory_current_bytes: u64,
        sync: Option<&SyncStatus>,
    ) -> Vec<Recommendation> {
        let mut findings = Vec::new();

        if memory_limit_bytes > 0 && memory_current_bytes > 0 {
            let percent = memory_current_bytes as f64 * 100.0 / memory_limit_bytes as f64;
            if percent > MEMORY_THRESHOLD_PERCENT {
                findings.push(Recommendation::warning(
                    "memory",
                    format!("Memory usage is high: {percent:.1}%"),
                    "Consider optimizing memory usage or increasing memory limit",
                ));
            }
        }

        let error_rate = snapshot.derived.error_rate;
        if snapshot.app_stats.requests > 0 && error_rate > ERROR_RATE_THRESHOLD_PERCENT {
            findings.push(Recommendation::error(
                "errors",
                format!("High error rate: {error_rate:.1}%"),
                "Review error logs and fix issues",
            ));
        }

        if let Some(status) = sync.filter(|s| s.issues_detected) {
            findings.push(Recommendation::warning(
                status.collaborator.clone(),
                format!("Sync issues detected in {}", status.collaborator),
                format!("Check {} synchronization between nodes", status.collaborator),
            ));
        }

        findings
    }
}
