//! Report commands for daily, weekly and monthly metrics.
//!
//! This module implements `ct day`, `ct week` and `ct month` with
//! human-readable and JSON output.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use ct_core::{
    CategoryHours, DailyMetrics, EventSource, PeriodMetrics, TimeTracker, WindowChunk,
    WindowedSummary,
};
use serde::Serialize;

// ========== Formatting Helpers ==========

/// Formats hours with one decimal, e.g. "2.5 hrs".
pub fn format_hours(hours: f64) -> String {
    format!("{hours:.1} hrs")
}

/// Generates a 10-character progress bar.
/// Positive values <5% of max get a single block for visibility.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn progress_bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value / max;
    let filled = if ratio <= 0.0 {
        0
    } else if ratio < 0.05 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Nothing to report: no category hours and no deep work.
fn is_empty_period(category_hours: &CategoryHours, deep_work_hours: f64) -> bool {
    category_hours.is_empty() && deep_work_hours == 0.0
}

fn write_summary(
    output: &mut String,
    category_hours: &CategoryHours,
    total_hours: f64,
    deep_work_hours: f64,
    deep_work_percentage: f64,
) {
    writeln!(output).unwrap();
    if is_empty_period(category_hours, deep_work_hours) {
        writeln!(output, "No events found for this period.").unwrap();
        return;
    }

    writeln!(output, "Total tracked:  {}", format_hours(total_hours)).unwrap();
    writeln!(
        output,
        "Deep work:      {} ({deep_work_percentage:.1}%)",
        format_hours(deep_work_hours)
    )
    .unwrap();

    writeln!(output).unwrap();
    writeln!(output, "BY CATEGORY").unwrap();
    writeln!(output, "───────────").unwrap();

    let sorted = category_hours.sorted_by_hours();
    if sorted.is_empty() {
        writeln!(output, "(no categorized hours)").unwrap();
    }
    let max = sorted.first().map_or(0.0, |(_, hours)| *hours);
    for (category, hours) in sorted {
        let bar = progress_bar(hours, max);
        writeln!(output, "{category:<24}{:>10}  {bar}", format_hours(hours)).unwrap();
    }
}

// ========== Human-Readable Reports ==========

/// Formats a single day.
pub fn format_daily_report(metrics: &DailyMetrics) -> String {
    let mut output = String::new();
    writeln!(
        output,
        "TIME REPORT: {}",
        metrics.date.format("%A, %b %-d, %Y")
    )
    .unwrap();
    write_summary(
        &mut output,
        &metrics.category_hours,
        metrics.total_hours,
        metrics.deep_work_hours,
        metrics.deep_work_percentage(),
    );
    output
}

/// Formats a week or month, followed by its daily breakdown.
pub fn format_period_report(metrics: &PeriodMetrics) -> String {
    let mut output = String::new();
    writeln!(output, "TIME REPORT: {}", metrics.period).unwrap();
    write_summary(
        &mut output,
        &metrics.category_hours,
        metrics.total_hours,
        metrics.deep_work_hours,
        metrics.deep_work_percentage(),
    );

    if is_empty_period(&metrics.category_hours, metrics.deep_work_hours) {
        return output;
    }

    // one column per category, in the same order as BY CATEGORY
    let columns: Vec<(&str, usize)> = metrics
        .category_hours
        .sorted_by_hours()
        .into_iter()
        .map(|(category, _)| (category, category.chars().count().max(6)))
        .collect();

    writeln!(output).unwrap();
    writeln!(output, "DAILY BREAKDOWN").unwrap();
    writeln!(output, "───────────────").unwrap();
    write!(output, "{:<10}  {:>6}  {:>6}", "Date", "Total", "Deep").unwrap();
    for &(category, width) in &columns {
        write!(output, "  {category:>width$}").unwrap();
    }
    writeln!(output).unwrap();

    for day in &metrics.daily {
        write!(
            output,
            "{:<10}  {:>6.1}  {:>6.1}",
            day.date.format("%Y-%m-%d"),
            day.total_hours,
            day.deep_work_hours
        )
        .unwrap();
        for &(category, width) in &columns {
            write!(output, "  {:>width$.1}", day.category_hours.get(category)).unwrap();
        }
        writeln!(output).unwrap();
    }
    output
}

fn chunk_label(chunk: &WindowChunk) -> String {
    format!(
        "{} - {}",
        chunk.first_date.format("%b %d"),
        chunk.last_date.format("%b %d")
    )
}

/// Formats seven-day windowed averages. Means are rounded for display.
pub fn format_windows_report(summary: &WindowedSummary) -> String {
    let mut output = String::new();
    let title = NaiveDate::from_ymd_opt(summary.year, summary.month, 1).map_or_else(
        || format!("{}-{:02}", summary.year, summary.month),
        |first| first.format("%B %Y").to_string(),
    );
    writeln!(output, "WINDOWED AVERAGES: {title} (mean hours per day)").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "{:<16}  {:>6}  {:>6}  Categories",
        "Days", "Total", "Deep"
    )
    .unwrap();

    for chunk in &summary.chunks {
        let rounded = chunk.rounded();
        let categories = if rounded.mean_category_hours.is_empty() {
            "-".to_string()
        } else {
            rounded
                .mean_category_hours
                .sorted_by_hours()
                .into_iter()
                .map(|(category, hours)| format!("{category} {hours:.2}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(
            output,
            "{:<16}  {:>6.2}  {:>6.2}  {categories}",
            chunk_label(chunk),
            rounded.mean_total_hours,
            rounded.mean_deep_work_hours
        )
        .unwrap();
    }
    output
}

// ========== JSON Output ==========

/// JSON record with the derived deep work percentage alongside.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a, T> {
    #[serde(flatten)]
    pub metrics: &'a T,
    pub deep_work_percentage: f64,
}

pub fn format_daily_json(metrics: &DailyMetrics) -> Result<String> {
    let report = JsonReport {
        metrics,
        deep_work_percentage: metrics.deep_work_percentage(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn format_period_json(metrics: &PeriodMetrics) -> Result<String> {
    let report = JsonReport {
        metrics,
        deep_work_percentage: metrics.deep_work_percentage(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Windowed averages as JSON, with means rounded to two decimals.
pub fn format_windows_json(summary: &WindowedSummary) -> Result<String> {
    let rounded = WindowedSummary {
        chunks: summary.chunks.iter().map(WindowChunk::rounded).collect(),
        ..summary.clone()
    };
    Ok(serde_json::to_string_pretty(&rounded)?)
}

// ========== Public Interface ==========

/// Runs the day report.
pub fn run_day<S: EventSource>(
    tracker: &TimeTracker<S>,
    date: NaiveDate,
    json: bool,
) -> Result<String> {
    let metrics = tracker.compute_daily(date)?;
    if json {
        format_daily_json(&metrics)
    } else {
        Ok(format_daily_report(&metrics))
    }
}

/// Runs the week report for the seven days starting at `week_start`.
pub fn run_week<S: EventSource>(
    tracker: &TimeTracker<S>,
    week_start: NaiveDate,
    json: bool,
) -> Result<String> {
    let metrics = tracker.compute_weekly(week_start)?;
    if json {
        format_period_json(&metrics)
    } else {
        Ok(format_period_report(&metrics))
    }
}

/// Runs the month report, or its windowed view.
pub fn run_month<S: EventSource>(
    tracker: &TimeTracker<S>,
    year: i32,
    month: u32,
    windows: bool,
    json: bool,
) -> Result<String> {
    if windows {
        let summary = tracker.compute_monthly_windows(year, month)?;
        return if json {
            format_windows_json(&summary)
        } else {
            Ok(format_windows_report(&summary))
        };
    }

    let metrics = tracker.compute_monthly(year, month)?;
    if json {
        format_period_json(&metrics)
    } else {
        Ok(format_period_report(&metrics))
    }
}
