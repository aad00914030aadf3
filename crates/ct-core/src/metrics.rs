//! Daily aggregation.
//!
//! # Algorithm Summary
//!
//! 1. Categorize and time every event of the day
//! 2. Track the earliest start and latest end over timed events only
//! 3. Sum every non-[`CHORES_AND_MISC`] duration into its category and into a
//!    running non-chores total; sum deep-work durations separately
//! 4. Fill [`CHORES_AND_MISC`] with `max(0, span - non_chores_total)` when at
//!    least one timed event was seen; otherwise leave the key out entirely
//!
//! Overlapping events are summed naively. Malformed durations are kept as-is.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{CHORES_AND_MISC, CategoryConfig};
use crate::event::{CalendarEvent, duration_hours};

/// Hours per category. Missing categories read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryHours(BTreeMap<String, f64>);

impl CategoryHours {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds hours to a category, starting from zero on first access.
    pub fn add(&mut self, category: &str, hours: f64) {
        *self.0.entry(category.to_string()).or_insert(0.0) += hours;
    }

    pub fn set(&mut self, category: &str, hours: f64) {
        self.0.insert(category.to_string(), hours);
    }

    /// Hours recorded for a category, zero when absent.
    pub fn get(&self, category: &str) -> f64 {
        self.0.get(category).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    /// Sum of all hours. An empty map totals `0.0`, never `-0.0`.
    pub fn total(&self) -> f64 {
        self.0.values().fold(0.0, |acc, hours| acc + hours)
    }

    /// Adds every entry of `other` key-wise.
    pub fn merge(&mut self, other: &Self) {
        for (category, hours) in other.iter() {
            self.add(category, hours);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(category, hours)| (category.as_str(), *hours))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries ordered by hours descending, then by name.
    pub fn sorted_by_hours(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for CategoryHours {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut hours = Self::new();
        for (category, value) in iter {
            hours.add(&category.into(), value);
        }
        hours
    }
}

/// Metrics for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub category_hours: CategoryHours,
    pub deep_work_hours: f64,
    /// Always the sum of `category_hours`.
    pub total_hours: f64,
}

impl DailyMetrics {
    /// An event-less day.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            category_hours: CategoryHours::new(),
            deep_work_hours: 0.0,
            total_hours: 0.0,
        }
    }

    /// Deep work as a percentage of total hours, 0 when nothing was tracked.
    pub fn deep_work_percentage(&self) -> f64 {
        percentage(self.deep_work_hours, self.total_hours)
    }
}

pub(crate) fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total * 100.0 } else { 0.0 }
}

/// Earliest start and latest end over a day's timed events.
#[derive(Debug, Clone, Copy, Default)]
struct Span {
    first_start: Option<DateTime<Utc>>,
    last_end: Option<DateTime<Utc>>,
}

impl Span {
    fn observe(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        if self.first_start.is_none_or(|first| start < first) {
            self.first_start = Some(start);
        }
        if self.last_end.is_none_or(|last| end > last) {
            self.last_end = Some(end);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn hours(&self) -> Option<f64> {
        let (first, last) = (self.first_start?, self.last_end?);
        Some((last - first).num_milliseconds() as f64 / 3_600_000.0)
    }
}

/// Aggregates one day's events into [`DailyMetrics`].
///
/// The caller supplies exactly the events belonging to `date`; order does not
/// matter.
pub fn aggregate_day(
    date: NaiveDate,
    events: &[CalendarEvent],
    config: &CategoryConfig,
) -> DailyMetrics {
    let categorizer = config.categorizer();
    let mut category_hours = CategoryHours::new();
    let mut deep_work_hours = 0.0;
    let mut non_chores_total = 0.0;
    let mut span = Span::default();

    for event in events {
        let category = categorizer.categorize(event.color_tag());
        let duration = duration_hours(event);

        if let Some((start, end)) = event.timed_bounds() {
            span.observe(start, end);
        }

        if category != CHORES_AND_MISC {
            category_hours.add(category, duration);
            non_chores_total += duration;
        }

        if categorizer.is_deep_work(category) {
            deep_work_hours += duration;
        }

        tracing::trace!(event = %event.id, category, duration, "categorized event");
    }

    if let Some(span_hours) = span.hours() {
        let unaccounted = (span_hours - non_chores_total).max(0.0);
        tracing::debug!(
            %date,
            span_hours,
            non_chores_total,
            unaccounted,
            "filled unaccounted time"
        );
        category_hours.set(CHORES_AND_MISC, unaccounted);
    }

    let total_hours = category_hours.total();
    DailyMetrics {
        date,
        category_hours,
        deep_work_hours,
        total_hours,
    }
}
