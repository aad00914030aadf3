//! Calendar events as handed over by an event source.
//!
//! Events arrive already resolved to a single reference zone (UTC). A boundary
//! is either a timed instant or a bare date; a date-only start marks a
//! full-day event.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Hours credited to a full-day event.
///
/// This is a business heuristic, not derived from any calendar metadata.
pub const FULL_DAY_HOURS: f64 = 8.0;

/// One boundary of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    /// A timed instant.
    DateTime(DateTime<Utc>),
    /// A date without a time of day (full-day events).
    Date(NaiveDate),
}

impl EventTime {
    /// Returns the boundary as an instant; dates resolve to midnight UTC.
    pub fn to_instant(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => *dt,
            Self::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

/// A calendar event (read-only input to the aggregation engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    /// Opaque color tag used as the sole categorization key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
}

impl CalendarEvent {
    pub fn color_tag(&self) -> Option<&str> {
        self.color_id.as_deref()
    }

    /// Whether this is a full-day event. Only the start boundary decides.
    pub const fn is_full_day(&self) -> bool {
        self.start.is_date()
    }

    pub const fn time_bounds(&self) -> (&EventTime, &EventTime) {
        (&self.start, &self.end)
    }

    /// Start and end instants for timed events, `None` for full-day events.
    pub fn timed_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        if self.is_full_day() {
            return None;
        }
        Some((self.start.to_instant(), self.end.to_instant()))
    }

    pub fn range_start(&self) -> DateTime<Utc> {
        self.start.to_instant()
    }

    pub fn range_end(&self) -> DateTime<Utc> {
        self.end.to_instant()
    }

    /// Whether the event belongs to the half-open window `[start, end)`.
    ///
    /// Events overlapping the window belong to it. An event whose end precedes
    /// its start still belongs to the window containing its start.
    pub fn overlaps_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let range_start = self.range_start();
        range_start < end && (self.range_end() > start || range_start >= start)
    }
}

/// Duration of an event in hours.
///
/// Full-day events yield [`FULL_DAY_HOURS`]. Timed events yield `end - start`,
/// which is negative or zero for malformed data and is returned as-is.
#[allow(clippy::cast_precision_loss)]
pub fn duration_hours(event: &CalendarEvent) -> f64 {
    match event.timed_bounds() {
        None => FULL_DAY_HOURS,
        Some((start, end)) => (end - start).num_milliseconds() as f64 / 3_600_000.0,
    }
}
