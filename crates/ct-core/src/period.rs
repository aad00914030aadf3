//! Weekly and monthly roll-ups of daily metrics.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metrics::{CategoryHours, DailyMetrics, percentage};

/// Days in a week period.
pub const WEEK_DAYS: usize = 7;

/// Identity of an aggregation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PeriodId {
    /// Seven consecutive days, both ends inclusive.
    Week { start: NaiveDate, end: NaiveDate },
    /// A calendar month.
    Month { year: i32, month: u32 },
}

impl PeriodId {
    pub fn week(start: NaiveDate) -> Result<Self, CoreError> {
        let end = start
            .checked_add_signed(Duration::days(6))
            .ok_or_else(|| CoreError::DateOutOfRange(start.to_string()))?;
        Ok(Self::Week { start, end })
    }

    pub fn month(year: i32, month: u32) -> Result<Self, CoreError> {
        first_of_month(year, month)?;
        Ok(Self::Month { year, month })
    }

    /// Every day of the period in calendar order.
    pub fn days(&self) -> Result<Vec<NaiveDate>, CoreError> {
        match *self {
            Self::Week { start, .. } => week_days(start),
            Self::Month { year, month } => month_days(year, month),
        }
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Week { start, end } => write!(
                f,
                "{} - {}",
                start.format("%b %d"),
                end.format("%b %d, %Y")
            ),
            Self::Month { year, month } => match NaiveDate::from_ymd_opt(year, month, 1) {
                Some(first) => write!(f, "{}", first.format("%B %Y")),
                None => write!(f, "{year}-{month:02}"),
            },
        }
    }
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, CoreError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(CoreError::InvalidMonth { year, month })
}

/// The seven consecutive days starting at `start`.
pub fn week_days(start: NaiveDate) -> Result<Vec<NaiveDate>, CoreError> {
    let days: Vec<_> = start.iter_days().take(WEEK_DAYS).collect();
    if days.len() < WEEK_DAYS {
        return Err(CoreError::DateOutOfRange(start.to_string()));
    }
    Ok(days)
}

/// Every day of a month, honoring leap years.
pub fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, CoreError> {
    let first = first_of_month(year, month)?;
    Ok(first
        .iter_days()
        .take_while(|day| day.month() == month)
        .collect())
}

/// Metrics summed over a week or month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub period: PeriodId,
    pub category_hours: CategoryHours,
    pub deep_work_hours: f64,
    pub total_hours: f64,
    /// One entry per day, calendar order.
    pub daily: Vec<DailyMetrics>,
}

impl PeriodMetrics {
    pub fn deep_work_percentage(&self) -> f64 {
        percentage(self.deep_work_hours, self.total_hours)
    }
}

/// Folds daily metrics into a period by summing.
///
/// Categories absent on a given day contribute zero. The caller supplies one
/// record per day of the period.
pub fn aggregate_period(period: PeriodId, daily: Vec<DailyMetrics>) -> PeriodMetrics {
    let mut category_hours = CategoryHours::new();
    let mut deep_work_hours = 0.0;
    let mut total_hours = 0.0;

    for day in &daily {
        category_hours.merge(&day.category_hours);
        deep_work_hours += day.deep_work_hours;
        total_hours += day.total_hours;
    }

    tracing::debug!(%period, days = daily.len(), total_hours, "aggregated period");

    PeriodMetrics {
        period,
        category_hours,
        deep_work_hours,
        total_hours,
        daily,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CHORES_AND_MISC;
    use crate::event::fixtures::date;

    fn day(date: NaiveDate, entries: &[(&str, f64)], deep_work_hours: f64) -> DailyMetrics {
        let category_hours: CategoryHours = entries.iter().copied().collect();
        let total_hours = category_hours.total();
        DailyMetrics {
            date,
            category_hours,
            deep_work_hours,
            total_hours,
        }
    }

    #[test]
    fn month_lengths_follow_calendar() {
        assert_eq!(month_days(2024, 2).unwrap().len(), 29);
        assert_eq!(month_days(2025, 2).unwrap().len(), 28);
        assert_eq!(month_days(1900, 2).unwrap().len(), 28);
        assert_eq!(month_days(2000, 2).unwrap().len(), 29);
        assert_eq!(month_days(2025, 1).unwrap().len(), 31);
        assert_eq!(month_days(2025, 4).unwrap().len(), 30);
        assert_eq!(month_days(2025, 12).unwrap().len(), 31);
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert_eq!(
            month_days(2025, 13),
            Err(CoreError::InvalidMonth {
                year: 2025,
                month: 13
            })
        );
        assert!(PeriodId::month(2025, 0).is_err());
    }

    #[test]
    fn week_spans_seven_days_across_month_end() {
        let days = week_days(date(2025, 1, 27)).unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2025, 1, 27));
        assert_eq!(days[6], date(2025, 2, 2));
        assert_eq!(
            PeriodId::week(date(2025, 1, 27)).unwrap(),
            PeriodId::Week {
                start: date(2025, 1, 27),
                end: date(2025, 2, 2)
            }
        );
    }

    #[test]
    fn aggregation_sums_keywise() {
        let daily = vec![
            day(date(2025, 1, 27), &[("Work", 3.0), (CHORES_AND_MISC, 1.0)], 3.0),
            day(date(2025, 1, 28), &[("Reading", 2.0)], 0.0),
            DailyMetrics::empty(date(2025, 1, 29)),
        ];
        let period = PeriodId::Week {
            start: date(2025, 1, 27),
            end: date(2025, 2, 2),
        };

        let metrics = aggregate_period(period, daily);

        assert_eq!(metrics.category_hours.len(), 3);
        assert!((metrics.category_hours.get("Work") - 3.0).abs() < 1e-9);
        assert!((metrics.category_hours.get("Reading") - 2.0).abs() < 1e-9);
        assert!((metrics.category_hours.get(CHORES_AND_MISC) - 1.0).abs() < 1e-9);
        assert!((metrics.total_hours - 6.0).abs() < 1e-9);
        assert!((metrics.deep_work_hours - 3.0).abs() < 1e-9);
        assert!((metrics.deep_work_percentage() - 50.0).abs() < 1e-9);
        assert_eq!(metrics.daily.len(), 3);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let daily = vec![
            day(date(2025, 3, 1), &[("Work", 1.25)], 1.25),
            day(date(2025, 3, 2), &[("Work", 2.5), ("Wasted Time", 0.75)], 2.5),
            day(date(2025, 3, 3), &[(CHORES_AND_MISC, 4.0)], 0.0),
        ];
        let period = PeriodId::Month {
            year: 2025,
            month: 3,
        };
        let mut reversed = daily.clone();
        reversed.reverse();

        let forward = aggregate_period(period, daily);
        let backward = aggregate_period(period, reversed);

        assert!((forward.total_hours - backward.total_hours).abs() < 1e-9);
        assert!((forward.deep_work_hours - backward.deep_work_hours).abs() < 1e-9);
        for (category, hours) in forward.category_hours.iter() {
            assert!((backward.category_hours.get(category) - hours).abs() < 1e-9);
        }
    }

    #[test]
    fn period_labels() {
        let week = PeriodId::week(date(2025, 1, 27)).unwrap();
        assert_eq!(week.to_string(), "Jan 27 - Feb 02, 2025");
        let month = PeriodId::month(2024, 2).unwrap();
        assert_eq!(month.to_string(), "February 2024");
    }
}
