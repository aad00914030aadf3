//! Event retrieval capability.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::CalendarEvent;

/// Failure to retrieve events. Fatal to the requested computation.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not be reached.
    #[error("event source unavailable: {0}")]
    Unavailable(String),

    /// The source refused access.
    #[error("event source unauthorized: {0}")]
    Unauthorized(String),

    /// The backing store failed.
    #[error("event source backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Supplies calendar events for a time window.
///
/// This trait lets aggregation run against different event stores
/// (e.g., the `SQLite` store in ct-db, a JSON Lines file, or test fixtures).
/// Retries and timeouts are the implementor's concern.
pub trait EventSource {
    /// Returns the events belonging to `[start, end)`, ordered by start.
    fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, SourceError>;
}

impl<S: EventSource + ?Sized> EventSource for &S {
    fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, SourceError> {
        (**self).fetch_events(start, end)
    }
}

/// An in-memory event source over a fixed list of events.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    events: Vec<CalendarEvent>,
}

impl VecSource {
    pub fn new(mut events: Vec<CalendarEvent>) -> Self {
        events.sort_by(|a, b| {
            a.range_start()
                .cmp(&b.range_start())
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for VecSource {
    fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, SourceError> {
        if end <= start {
            return Ok(Vec::new());
        }
        Ok(self
            .events
            .iter()
            .filter(|event| event.overlaps_window(start, end))
            .cloned()
            .collect())
    }
}
