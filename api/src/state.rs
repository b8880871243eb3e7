//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use shared::config::{ConfigError, DevToolsConfig};
use shared::history::{EventHistoryProvider, SyncStatusProvider};
use shared::insights::InsightsCollector;
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Holds the insights collector, which owns the configuration and the injected
/// collaborators.
#[derive(Debug, Clone)]
pub struct AppState {
    collector: Arc<InsightsCollector>,
}

impl AppState {
    /// Creates a new application state around `collector`.
    #[must_use]
    pub fn new(collector: InsightsCollector) -> Self {
        Self {
            collector: Arc::new(collector),
        }
    }

    /// Creates a state without collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: DevToolsConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(InsightsCollector::new(config)?))
    }

    /// Attaches the event history collaborator.
    #[must_use]
    pub fn with_event_history(self, provider: Arc<dyn EventHistoryProvider>) -> Self {
        Self::new(self.owned_collector().with_event_history(provider))
    }

    /// Attaches the synchronization status collaborator.
    #[must_use]
    pub fn with_sync_status(self, provider: Arc<dyn SyncStatusProvider>) -> Self {
        Self::new(self.owned_collector().with_sync_status(provider))
    }

    /// Returns a handle to the collector, suitable for moving into blocking tasks.
    #[must_use]
    pub fn collector(&self) -> Arc<InsightsCollector> {
        Arc::clone(&self.collector)
    }

    fn owned_collector(self) -> InsightsCollector {
        Arc::try_unwrap(self.collector).unwrap_or_else(|shared| (*shared).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::history::InMemoryEventHistory;
    use shared::models::Event;

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let config = DevToolsConfig::default().with_worker_num(0);
        assert!(AppState::from_config(config).is_err());
    }

    #[test]
    fn test_app_state_is_clone() {
        let history = Arc::new(InMemoryEventHistory::new(10));
        let state = AppState::from_config(DevToolsConfig::default())
            .unwrap()
            .with_event_history(history.clone());
        let state2 = state.clone();

        // Both should see the same history
        history.record(Event::new("1", "job", 1.0)).unwrap();

        assert_eq!(state.collector().history().events().len(), 1);
        assert_eq!(state2.collector().history().events().len(), 1);
    }
}
