//! Integration tests for the devscope API.
//!
//! These tests drive the full router against a throwaway `var` directory, covering
//! log viewing, metrics, the profiler and the dashboard report.

mod integration_tests {
    mod common;
    mod health_tests;
    mod insights_tests;
    mod logs_tests;
    mod metrics_tests;
    mod profiler_tests;
}
