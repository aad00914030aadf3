//! Events command for inspecting how a day's events are categorized.
//!
//! Prints each event with its color id and resolved category, or JSONL
//! with `--json`. Useful when setting up `[categories.colors]`.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use ct_core::{CategorizedEvent, EventSource, EventTime, TimeTracker, UNCATEGORIZED, day_window};

/// Runs the events command for a single day.
pub fn run<S: EventSource>(tracker: &TimeTracker<S>, date: NaiveDate, json: bool) -> Result<String> {
    let (start, end) = day_window(date)?;
    let events = tracker.categorized_events(start, end)?;

    if json {
        let mut output = String::new();
        for event in &events {
            writeln!(output, "{}", serde_json::to_string(event)?)?;
        }
        return Ok(output);
    }

    Ok(format_events(date, &events))
}

fn start_label(start: &EventTime) -> String {
    match start {
        EventTime::DateTime(at) => at.format("%H:%M").to_string(),
        EventTime::Date(_) => "all-day".to_string(),
    }
}

fn format_events(date: NaiveDate, events: &[CategorizedEvent]) -> String {
    let mut output = String::new();
    writeln!(output, "EVENTS: {}", date.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();

    if events.is_empty() {
        writeln!(output, "No events found for this day.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<7}  {:>5}  {:<5}  {:<20}  Summary",
        "Start", "Hours", "Color", "Category"
    )
    .unwrap();
    for event in events {
        writeln!(
            output,
            "{:<7}  {:>5.2}  {:<5}  {:<20}  {}",
            start_label(&event.start),
            event.duration_hours,
            event.color_id.as_deref().unwrap_or("-"),
            event.category,
            event.summary
        )
        .unwrap();
    }

    if events.iter().any(|event| event.category == UNCATEGORIZED) {
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: map unknown color ids under [categories.colors] in config.toml."
        )
        .unwrap();
    }
    output
}
