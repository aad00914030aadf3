//! Seven-day windowed averages for the monthly trend view.
//!
//! A month's daily records are split into consecutive chunks of
//! [`WINDOW_DAYS`] days; the last chunk holds the remainder. Means are taken
//! over the days present in each chunk, and a day that did not record a
//! category contributes zero hours to that category's mean.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metrics::{CategoryHours, DailyMetrics};
use crate::period::{PeriodId, PeriodMetrics};

/// Days per window.
pub const WINDOW_DAYS: usize = 7;

/// Mean daily hours over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowChunk {
    /// Zero-based position of the chunk within the month.
    pub index: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Number of days in the chunk (1..=7).
    pub days: usize,
    pub mean_category_hours: CategoryHours,
    pub mean_total_hours: f64,
    pub mean_deep_work_hours: f64,
}

impl WindowChunk {
    /// Copy with every mean rounded to two decimals, for display.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            mean_category_hours: self
                .mean_category_hours
                .iter()
                .map(|(category, hours)| (category, round_hours(hours)))
                .collect(),
            mean_total_hours: round_hours(self.mean_total_hours),
            mean_deep_work_hours: round_hours(self.mean_deep_work_hours),
            ..self.clone()
        }
    }
}

/// Windowed averages for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedSummary {
    pub year: i32,
    pub month: u32,
    pub chunks: Vec<WindowChunk>,
}

/// Rounds hours to two decimal places.
pub fn round_hours(hours: f64) -> f64 {
    let rounded = (hours * 100.0).round() / 100.0;
    // -0.004 rounds to -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Splits ordered daily records into windows and averages each one.
#[allow(clippy::cast_precision_loss)]
pub fn windowed_averages(daily: &[DailyMetrics]) -> Vec<WindowChunk> {
    daily
        .chunks(WINDOW_DAYS)
        .enumerate()
        .filter_map(|(index, chunk)| {
            let (first, last) = (chunk.first()?, chunk.last()?);
            let days = chunk.len() as f64;

            // zero-fill: every category seen in the chunk is averaged over all days
            let mut sums = CategoryHours::new();
            for day in chunk {
                sums.merge(&day.category_hours);
            }
            let mean_category_hours = sums
                .iter()
                .map(|(category, hours)| (category, hours / days))
                .collect();

            let total = chunk.iter().fold(0.0, |acc, day| acc + day.total_hours);
            let deep_work = chunk.iter().fold(0.0, |acc, day| acc + day.deep_work_hours);

            Some(WindowChunk {
                index,
                first_date: first.date,
                last_date: last.date,
                days: chunk.len(),
                mean_category_hours,
                mean_total_hours: total / days,
                mean_deep_work_hours: deep_work / days,
            })
        })
        .collect()
}

/// Windowed averages over a monthly period.
pub fn summarize_month(metrics: &PeriodMetrics) -> Result<WindowedSummary, CoreError> {
    let PeriodId::Month { year, month } = metrics.period else {
        return Err(CoreError::NotAMonth);
    };
    Ok(WindowedSummary {
        year,
        month,
        chunks: windowed_averages(&metrics.daily),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CHORES_AND_MISC;
    use crate::event::fixtures::date;
    use crate::period::{aggregate_period, month_days};

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

    fn empty_month(year: i32, month: u32) -> Vec<DailyMetrics> {
        month_days(year, month)
            .unwrap()
            .into_iter()
            .map(DailyMetrics::empty)
            .collect()
    }

    #[test]
    fn thirty_one_day_month_has_five_chunks() {
        let chunks = windowed_averages(&empty_month(2025, 1));
        let lengths: Vec<_> = chunks.iter().map(|chunk| chunk.days).collect();
        assert_eq!(lengths, vec![7, 7, 7, 7, 3]);
        assert_eq!(chunks[4].first_date, date(2025, 1, 29));
        assert_eq!(chunks[4].last_date, date(2025, 1, 31));
        assert_eq!(chunks[4].index, 4);
    }

    #[test]
    fn february_non_leap_has_four_full_chunks() {
        let chunks = windowed_averages(&empty_month(2025, 2));
        let lengths: Vec<_> = chunks.iter().map(|chunk| chunk.days).collect();
        assert_eq!(lengths, vec![7, 7, 7, 7]);

        let leap = windowed_averages(&empty_month(2024, 2));
        let lengths: Vec<_> = leap.iter().map(|chunk| chunk.days).collect();
        assert_eq!(lengths, vec![7, 7, 7, 7, 1]);
    }

    #[test]
    fn empty_chunks_average_to_positive_zero() {
        let daily: Vec<_> = month_days(2025, 1)
            .unwrap()
            .into_iter()
            .map(|date| day(date, &[], 0.0))
            .collect();

        for chunk in windowed_averages(&daily) {
            assert!(!chunk.mean_total_hours.is_sign_negative());
            assert!(!chunk.mean_deep_work_hours.is_sign_negative());
            assert!(!chunk.rounded().mean_total_hours.is_sign_negative());
        }
    }

    #[test]
    fn missing_categories_count_as_zero() {
        let mut daily = empty_month(2025, 1);
        daily[0] = day(date(2025, 1, 1), &[("Work", 7.0), (CHORES_AND_MISC, 1.0)], 7.0);
        daily[3] = day(date(2025, 1, 4), &[("Reading", 3.5)], 0.0);

        let chunks = windowed_averages(&daily);
        let first = &chunks[0];

        assert!((first.mean_category_hours.get("Work") - 1.0).abs() < 1e-9);
        assert!((first.mean_category_hours.get("Reading") - 0.5).abs() < 1e-9);
        assert!((first.mean_category_hours.get(CHORES_AND_MISC) - 1.0 / 7.0).abs() < 1e-9);
        assert!((first.mean_total_hours - 11.5 / 7.0).abs() < 1e-9);
        assert!((first.mean_deep_work_hours - 1.0).abs() < 1e-9);

        assert!(chunks[1].mean_category_hours.is_empty());
        assert!(chunks[1].mean_total_hours.abs() < 1e-9);
    }

    #[test]
    fn short_chunk_divides_by_its_own_length() {
        let mut daily = empty_month(2025, 1);
        daily[29] = day(date(2025, 1, 30), &[("Work", 6.0)], 6.0);

        let chunks = windowed_averages(&daily);
        let last = &chunks[4];

        assert_eq!(last.days, 3);
        assert!((last.mean_total_hours - 2.0).abs() < 1e-9);
        assert!((last.mean_category_hours.get("Work") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rounding_is_for_display_only() {
        let mut daily = empty_month(2025, 1);
        daily[0] = day(date(2025, 1, 1), &[("Work", 1.0)], 1.0);

        let chunks = windowed_averages(&daily);
        let rounded = chunks[0].rounded();

        assert!((rounded.mean_total_hours - 0.14).abs() < 1e-12);
        assert!((rounded.mean_category_hours.get("Work") - 0.14).abs() < 1e-12);
        assert!((chunks[0].mean_total_hours - 1.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn round_hours_uses_two_decimals() {
        assert!((round_hours(2.345_67) - 2.35).abs() < 1e-12);
        assert!((round_hours(-0.004) - 0.0).abs() < 1e-12);
        assert!(!round_hours(-0.004).is_sign_negative());
    }

    #[test]
    fn summarize_requires_monthly_period() {
        let monthly = aggregate_period(PeriodId::month(2025, 1).unwrap(), empty_month(2025, 1));
        let summary = summarize_month(&monthly).unwrap();
        assert_eq!((summary.year, summary.month), (2025, 1));
        assert_eq!(summary.chunks.len(), 5);

        let weekly = aggregate_period(PeriodId::week(date(2025, 1, 6)).unwrap(), Vec::new());
        assert_eq!(summarize_month(&weekly), Err(CoreError::NotAMonth));
    }
}
