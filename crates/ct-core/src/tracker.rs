//! Entry points for daily, weekly and monthly metrics.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::CategoryConfig;
use crate::error::{CoreError, TrackerError};
use crate::event::{EventTime, duration_hours};
use crate::metrics::{DailyMetrics, aggregate_day};
use crate::period::{PeriodId, PeriodMetrics, aggregate_period};
use crate::source::EventSource;
use crate::window::{WindowedSummary, summarize_month};

/// An event annotated with its category, for inspecting color mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedEvent {
    pub id: String,
    pub summary: String,
    pub start: EventTime,
    pub duration_hours: f64,
    pub color_id: Option<String>,
    pub category: String,
}

/// Computes metrics from events supplied by an [`EventSource`].
///
/// Every computation fetches what it needs and returns a fresh record;
/// nothing is cached between calls.
#[derive(Debug)]
pub struct TimeTracker<S> {
    source: S,
    config: CategoryConfig,
}

/// The half-open UTC window `[date 00:00, date + 1 00:00)`.
pub fn day_window(date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>), CoreError> {
    let next = date
        .checked_add_signed(Duration::days(1))
        .ok_or_else(|| CoreError::DateOutOfRange(date.to_string()))?;
    Ok((
        date.and_time(NaiveTime::MIN).and_utc(),
        next.and_time(NaiveTime::MIN).and_utc(),
    ))
}

impl<S: EventSource> TimeTracker<S> {
    /// Creates a tracker, rejecting an invalid category configuration.
    pub fn new(source: S, config: CategoryConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn compute_daily(&self, date: NaiveDate) -> Result<DailyMetrics, TrackerError> {
        let (start, end) = day_window(date)?;
        let events = self.source.fetch_events(start, end)?;
        tracing::debug!(%date, events = events.len(), "fetched day");
        Ok(aggregate_day(date, &events, &self.config))
    }

    /// Metrics for the seven days starting at `week_start`.
    pub fn compute_weekly(&self, week_start: NaiveDate) -> Result<PeriodMetrics, TrackerError> {
        self.compute_period(PeriodId::week(week_start)?)
    }

    pub fn compute_monthly(&self, year: i32, month: u32) -> Result<PeriodMetrics, TrackerError> {
        self.compute_period(PeriodId::month(year, month)?)
    }

    pub fn compute_monthly_windows(
        &self,
        year: i32,
        month: u32,
    ) -> Result<WindowedSummary, TrackerError> {
        let monthly = self.compute_monthly(year, month)?;
        Ok(summarize_month(&monthly)?)
    }

    /// Each day is computed independently from its own window.
    fn compute_period(&self, period: PeriodId) -> Result<PeriodMetrics, TrackerError> {
        let daily = period
            .days()?
            .into_iter()
            .map(|date| self.compute_daily(date))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(aggregate_period(period, daily))
    }

    /// Events in `[start, end)` with their duration and category.
    pub fn categorized_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CategorizedEvent>, TrackerError> {
        let categorizer = self.config.categorizer();
        let events = self.source.fetch_events(start, end)?;
        Ok(events
            .into_iter()
            .map(|event| CategorizedEvent {
                duration_hours: duration_hours(&event),
                category: categorizer.categorize(event.color_tag()).to_string(),
                id: event.id,
                summary: event.summary,
                start: event.start,
                color_id: event.color_id,
            })
            .collect())
    }
}
