//! Collaborators that supply event history and synchronization status.
//!
//! Both are owned elsewhere and consumed read-only. They are passed in explicitly
//! (usually as `Arc<dyn ...>`) rather than looked up globally.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::models::Event;

/// Errors raised by history and sync-status collaborators.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Failed to acquire lock on the history buffer.
    #[error("Failed to acquire lock on event history")]
    LockError,

    /// The collaborator could not produce a result.
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Source of recently recorded events.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait EventHistoryProvider: Send + Sync {
    /// Returns a snapshot of the recorded events, in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    fn history(&self) -> Result<Vec<Event>, HistoryError>;
}

/// Synchronization status reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Name of the collaborator, used as the recommendation category.
    pub collaborator: String,
    /// True when the collaborator detected a synchronization anomaly.
    pub issues_detected: bool,
}

impl SyncStatus {
    /// Creates a sync status.
    #[must_use]
    pub fn new(collaborator: impl Into<String>, issues_detected: bool) -> Self {
        Self {
            collaborator: collaborator.into(),
            issues_detected,
        }
    }
}

/// Source of synchronization status.
pub trait SyncStatusProvider: Send + Sync {
    /// Returns the current status.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be determined.
    fn sync_status(&self) -> Result<SyncStatus, HistoryError>;
}

impl SyncStatusProvider for SyncStatus {
    fn sync_status(&self) -> Result<SyncStatus, HistoryError> {
        Ok(self.clone())
    }
}

/// Default number of events kept by [`InMemoryEventHistory`].
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Bounded in-memory event history.
///
/// Once `capacity` events are held, recording a new one evicts the oldest recorded.
/// Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct InMemoryEventHistory {
    capacity: usize,
    events: Arc<RwLock<VecDeque<Event>>>,
}

impl InMemoryEventHistory {
    /// Creates an empty history holding at most `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
        }
    }

    /// Records an event, evicting the oldest when full.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn record(&self, event: Event) -> Result<(), HistoryError> {
        if self.capacity == 0 {
            return Ok(());
        }
        let mut events = self.events.write().map_err(|_| HistoryError::LockError)?;
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
        Ok(())
    }

    /// Number of events held.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn len(&self) -> Result<usize, HistoryError> {
        let events = self.events.read().map_err(|_| HistoryError::LockError)?;
        Ok(events.len())
    }

    /// Returns true if no events are held.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, HistoryError> {
        Ok(self.len()? == 0)
    }

    /// Removes every event.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn clear(&self) -> Result<(), HistoryError> {
        let mut events = self.events.write().map_err(|_| HistoryError::LockError)?;
        events.clear();
        Ok(())
    }
}

impl Default for InMemoryEventHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EventHistoryProvider for InMemoryEventHistory {
    fn history(&self) -> Result<Vec<Event>, HistoryError> {
        let events = self.events.read().map_err(|_| HistoryError::LockError)?;
        Ok(events.iter().cloned().collect())
    }
}
