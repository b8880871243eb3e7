//! Newest-first selection shared by every "most recent N" view.
//!
//! Log entries, profiled events and error reports are all listed by sorting
//! descending on their timestamp and keeping the first `n`. Routing every caller
//! through [`top_n_by_timestamp_desc`] keeps tie-breaking and truncation identical.

use std::cmp::Ordering;

use crate::models::{Event, LogLine};

/// Items that can be ordered by recency.
pub trait Timestamped {
    /// Compares `self` with `other` by timestamp, oldest first.
    ///
    /// Must be a total order.
    fn cmp_timestamp(&self, other: &Self) -> Ordering;
}

impl Timestamped for LogLine {
    fn cmp_timestamp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }
}

impl Timestamped for Event {
    fn cmp_timestamp(&self, other: &Self) -> Ordering {
        self.timestamp.total_cmp(&other.timestamp)
    }
}

impl<T: Timestamped> Timestamped for &T {
    fn cmp_timestamp(&self, other: &Self) -> Ordering {
        (**self).cmp_timestamp(*other)
    }
}

/// Sorts `items` newest-first and keeps at most `n` of them.
///
/// The sort is stable: items with equal timestamps keep their input order.
///
/// # Example
///
/// ```
/// use shared::models::Event;
/// use shared::ordering::top_n_by_timestamp_desc;
///
/// let events = vec![
///     Event::new("a", "job", 1.0),
///     Event::new("b", "job", 3.0),
///     Event::new("c", "job", 2.0),
/// ];
///
/// let newest = top_n_by_timestamp_desc(events, 2);
/// let ids: Vec<_> = newest.iter().map(|e| e.id.as_str()).collect();
/// assert_eq!(ids, ["b", "c"]);
/// ```
#[must_use]
pub fn top_n_by_timestamp_desc<T: Timestamped>(mut items: Vec<T>, n: usize) -> Vec<T> {
    items.sort_by(|a, b| b.cmp_timestamp(a));
    items.truncate(n);
    items
}
