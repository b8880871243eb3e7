//! Read-only consumption of the external event history.
//!
//! The history itself is recorded by a profiler outside this crate. Consumers get a
//! snapshot through [`EventHistoryProvider`] and query it with [`EventHistoryView`].

pub mod provider;
pub mod view;

pub use provider::{
    EventHistoryProvider, HistoryError, InMemoryEventHistory, SyncStatus, SyncStatusProvider,
    DEFAULT_HISTORY_CAPACITY,
};
pub use view::{
    extract_error_code, format_event_time, normalize_trace, ErrorContext, ErrorDetails,
    ErrorReport, EventHistoryView, HistoryStatistics, ProfiledEvent, RequestHeaders,
    RequestSummary,
};
