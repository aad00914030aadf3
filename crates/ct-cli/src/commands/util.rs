//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Datelike, Duration, Local, NaiveDate};
use regex::Regex;

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Pre-compiled regex for `YYYY-MM` months.
static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());

/// Conservative bound for relative dates (~1000 years in days).
const MAX_RELATIVE_DAYS: i64 = 1000 * 365;

/// Today's date on the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a date string as either `YYYY-MM-DD` or a relative date.
///
/// Supports:
/// - ISO 8601 date: "2025-01-29"
/// - Keywords: "today", "yesterday"
/// - Relative: "3 days ago", "1 week ago"
pub fn parse_date(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    match s {
        "today" => return Ok(today),
        "yesterday" => {
            return today
                .pred_opt()
                .context("date out of range");
        }
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD (e.g., 2025-01-29), 'today', 'yesterday' or relative (e.g., '3 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;

    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        anyhow::bail!("Relative date value too large: {n} {}", &caps[2]);
    }

    today
        .checked_sub_signed(Duration::days(n * days_per_unit))
        .context("date out of range")
}

/// Parse an optional date argument, defaulting to today.
pub fn parse_date_or_today(s: Option<&str>, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    s.map_or(Ok(today), |s| parse_date(s, today))
}

/// Parse a `YYYY-MM` month.
pub fn parse_month(s: &str) -> anyhow::Result<(i32, u32)> {
    let Some(caps) = MONTH_RE.captures(s.trim()) else {
        anyhow::bail!("Invalid month: {s}. Use YYYY-MM (e.g., 2025-01)");
    };
    let year: i32 = caps[1].parse().context("failed to parse year")?;
    let month: u32 = caps[2].parse().context("failed to parse month")?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("Invalid month: {s}. Month must be between 01 and 12");
    }
    Ok((year, month))
}

/// The Monday on or before `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(days_since_monday))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parses_iso_dates() {
        let today = date(2025, 1, 29);
        assert_eq!(parse_date("2024-02-29", today).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn parses_keywords_and_relative_dates() {
        let today = date(2025, 1, 29);
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(parse_date("yesterday", today).unwrap(), date(2025, 1, 28));
        assert_eq!(parse_date("3 days ago", today).unwrap(), date(2025, 1, 26));
        assert_eq!(parse_date("1 day ago", today).unwrap(), date(2025, 1, 28));
        assert_eq!(parse_date("2 weeks ago", today).unwrap(), date(2025, 1, 15));
    }

    #[test]
    fn rejects_invalid_dates() {
        let today = date(2025, 1, 29);
        assert!(parse_date("2025-02-30", today).is_err());
        assert!(parse_date("tomorrow", today).is_err());
        assert!(parse_date("3 months ago", today).is_err());
        assert!(parse_date("999999999 weeks ago", today).is_err());
    }

    #[test]
    fn defaults_to_today() {
        let today = date(2025, 1, 29);
        assert_eq!(parse_date_or_today(None, today).unwrap(), today);
    }

    #[test]
    fn parses_months() {
        assert_eq!(parse_month("2025-01").unwrap(), (2025, 1));
        assert_eq!(parse_month("2024-2").unwrap(), (2024, 2));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("2025-00").is_err());
        assert!(parse_month("January").is_err());
    }

    #[test]
    fn monday_snapping() {
        // Jan 29, 2025 is a Wednesday
        assert_eq!(monday_of(date(2025, 1, 29)), date(2025, 1, 27));
        assert_eq!(monday_of(date(2025, 1, 27)), date(2025, 1, 27));
        assert_eq!(monday_of(date(2025, 2, 2)), date(2025, 1, 27));
    }
}
