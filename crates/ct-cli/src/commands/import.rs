//! Import command for loading calendar events into the local `SQLite` store.
//!
//! Events are read as JSON Lines in the calendar API shape:
//!
//! ```json
//! {"id":"abc","summary":"Standup","start":{"dateTime":"2025-01-29T09:00:00-05:00"},"end":{"dateTime":"2025-01-29T09:15:00-05:00"},"colorId":"10"}
//! {"id":"def","summary":"Offsite","start":{"date":"2025-01-30"},"end":{"date":"2025-01-31"}}
//! ```
//!
//! Timed boundaries are converted to UTC on the way in.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use ct_core::{CalendarEvent, EventTime};
use ct_db::Database;
use serde::Deserialize;

/// Reads events from stdin and upserts them into the database.
pub fn run(db: &mut Database) -> Result<usize> {
    let stdin = io::stdin();
    let events = parse_events(stdin.lock())?;
    let written = db.upsert_events(&events)?;
    tracing::info!(read = events.len(), written, "imported events");
    Ok(events.len())
}

/// Loads events from a JSON Lines file.
pub fn load_events_file(path: &Path) -> Result<Vec<CalendarEvent>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_events(BufReader::new(file))
        .with_context(|| format!("failed to read events from {}", path.display()))
}

fn parse_events<R: BufRead>(reader: R) -> Result<Vec<CalendarEvent>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: ImportEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let event = parsed
            .into_event()
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        events.push(event);
    }
    Ok(events)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    start: ImportTime,
    end: ImportTime,
    #[serde(default)]
    color_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl ImportTime {
    fn into_event_time(self, field: &str) -> Result<EventTime> {
        if let Some(value) = self.date_time {
            let parsed = DateTime::parse_from_rfc3339(&value)
                .with_context(|| format!("invalid {field}.dateTime: {value}"))?;
            return Ok(EventTime::DateTime(parsed.with_timezone(&Utc)));
        }
        if let Some(value) = self.date {
            let parsed = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                .with_context(|| format!("invalid {field}.date: {value}"))?;
            return Ok(EventTime::Date(parsed));
        }
        Err(anyhow::anyhow!("missing {field}.dateTime or {field}.date"))
    }
}

impl ImportEvent {
    fn into_event(self) -> Result<CalendarEvent> {
        if self.id.trim().is_empty() {
            return Err(anyhow::anyhow!("missing id"));
        }
        Ok(CalendarEvent {
            id: self.id,
            summary: self.summary.unwrap_or_default(),
            start: self.start.into_event_time("start")?,
            end: self.end.into_event_time("end")?,
            color_id: self.color_id,
        })
    }
}
