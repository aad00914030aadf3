//! Storage layer for imported calendar events.
//!
//! Provides a local event store using `rusqlite` that implements
//! [`EventSource`], so metrics can be computed without a network round trip.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Event Boundaries
//!
//! `start_value` and `end_value` keep each boundary as received: a bare date
//! (`2025-01-29`) for full-day boundaries or an ISO 8601 instant
//! (`2025-01-29T09:00:00.000Z`). `range_start` and `range_end` hold both
//! boundaries as UTC instants (dates at midnight) so window queries can use
//! lexicographic comparison.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use ct_core::{CalendarEvent, EventSource, EventTime, SourceError};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row cannot be turned back into an event.
    #[error("invalid event data for {event_id}: {message}")]
    InvalidEventData { event_id: String, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- calendar_events: one row per source event id
            -- start_value/end_value: bare date or ISO 8601 instant, as received
            -- range_start/range_end: ISO 8601 UTC instants for window queries
            CREATE TABLE IF NOT EXISTS calendar_events (
                id TEXT PRIMARY KEY,
                summary TEXT NOT NULL DEFAULT '',
                start_value TEXT NOT NULL,
                end_value TEXT NOT NULL,
                all_day INTEGER NOT NULL DEFAULT 0,
                color_id TEXT,
                range_start TEXT NOT NULL,
                range_end TEXT NOT NULL,
                imported_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_calendar_events_range_start ON calendar_events(range_start);
            CREATE INDEX IF NOT EXISTS idx_calendar_events_range_end ON calendar_events(range_end);
            ",
        )?;
        Ok(())
    }

    /// Inserts or replaces a batch of events by ID in a single transaction.
    ///
    /// Re-importing an event overwrites its times, summary and color.
    pub fn upsert_events(&mut self, events: &[CalendarEvent]) -> Result<usize, DbError> {
        if events.is_empty() {
            return Ok(0);
        }
        let imported_at = format_timestamp(Utc::now());
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO calendar_events
                (id, summary, start_value, end_value, all_day, color_id, range_start, range_end, imported_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    summary = excluded.summary,
                    start_value = excluded.start_value,
                    end_value = excluded.end_value,
                    all_day = excluded.all_day,
                    color_id = excluded.color_id,
                    range_start = excluded.range_start,
                    range_end = excluded.range_end,
                    imported_at = excluded.imported_at
                ",
            )?;
            for event in events {
                written += stmt.execute(params![
                    event.id,
                    event.summary,
                    format_event_time(&event.start),
                    format_event_time(&event.end),
                    event.is_full_day(),
                    event.color_id,
                    format_timestamp(event.range_start()),
                    format_timestamp(event.range_end()),
                    imported_at,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(written, "upserted calendar events");
        Ok(written)
    }

    /// Lists events belonging to a time range, ordered by start then ID.
    ///
    /// The range is inclusive of `start` and exclusive of `end`. Events that
    /// overlap the range belong to it, as do events whose end precedes their
    /// start when the start falls inside the range.
    pub fn list_events_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let start = format_timestamp(start);
        let end = format_timestamp(end);
        let mut stmt = self.conn.prepare(
            "
            SELECT id, summary, start_value, end_value, color_id
            FROM calendar_events
            WHERE range_start < ?2 AND (range_end > ?1 OR range_start >= ?1)
            ORDER BY range_start ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([start, end], StoredEvent::from_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        Ok(events)
    }

    /// Number of stored events.
    pub fn event_count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM calendar_events", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Earliest start and latest end over all stored events.
    pub fn stored_range(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, DbError> {
        let bounds: Option<(Option<String>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT MIN(range_start), MAX(range_end) FROM calendar_events",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((Some(first), Some(last))) = bounds else {
            return Ok(None);
        };
        Ok(Some((
            parse_timestamp(&first, "(range)")?,
            parse_timestamp(&last, "(range)")?,
        )))
    }
}

impl EventSource for Database {
    fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, SourceError> {
        self.list_events_in_range(start, end)
            .map_err(|err| SourceError::Backend(Box::new(err)))
    }
}

/// A row as stored, before boundary parsing.
struct StoredEvent {
    id: String,
    summary: String,
    start_value: String,
    end_value: String,
    color_id: Option<String>,
}

impl StoredEvent {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            summary: row.get(1)?,
            start_value: row.get(2)?,
            end_value: row.get(3)?,
            color_id: row.get(4)?,
        })
    }

    fn into_event(self) -> Result<CalendarEvent, DbError> {
        let start = parse_event_time(&self.start_value, &self.id)?;
        let end = parse_event_time(&self.end_value, &self.id)?;
        Ok(CalendarEvent {
            id: self.id,
            summary: self.summary,
            start,
            end,
            color_id: self.color_id,
        })
    }
}

fn format_event_time(time: &EventTime) -> String {
    match time {
        EventTime::DateTime(dt) => format_timestamp(*dt),
        EventTime::Date(date) => date.format("%Y-%m-%d").to_string(),
    }
}

fn parse_event_time(value: &str, event_id: &str) -> Result<EventTime, DbError> {
    if value.is_empty() {
        return Err(DbError::InvalidEventData {
            event_id: event_id.to_string(),
            message: "empty boundary".to_string(),
        });
    }
    if !value.contains('T') {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(EventTime::Date)
            .map_err(|source| DbError::TimestampParse {
                event_id: event_id.to_string(),
                timestamp: value.to_string(),
                source,
            });
    }
    parse_timestamp(value, event_id).map(EventTime::DateTime)
}

fn parse_timestamp(timestamp: &str, event_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id: event_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn instant(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&day.and_hms_opt(hour, minute, 0).unwrap())
    }

    fn timed(id: &str, day: NaiveDate, start: u32, end: u32, color: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: format!("event {id}"),
            start: EventTime::DateTime(instant(day, start, 0)),
            end: EventTime::DateTime(instant(day, end, 0)),
            color_id: color.map(str::to_string),
        }
    }

    fn full_day(id: &str, day: NaiveDate) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: format!("event {id}"),
            start: EventTime::Date(day),
            end: EventTime::Date(day.succ_opt().unwrap()),
            color_id: None,
        }
    }

    fn day_range(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (instant(day, 0, 0), instant(day.succ_opt().unwrap(), 0, 0))
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        let columns = table_columns(&db.conn, "calendar_events");
        assert_eq!(
            columns,
            vec![
                "id",
                "summary",
                "start_value",
                "end_value",
                "all_day",
                "color_id",
                "range_start",
                "range_end",
                "imported_at",
            ]
        );

        let indexes = index_names(&db.conn, "calendar_events");
        let expected: HashSet<String> = [
            "idx_calendar_events_range_start",
            "idx_calendar_events_range_end",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert!(expected.is_subset(&indexes));
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    fn index_names(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA index_list({table})"))
            .expect("prepare index_list");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query index_list");
        rows.map(|row| row.expect("index_list row")).collect()
    }

    #[test]
    fn upsert_replaces_existing_event() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let day = date(2025, 1, 29);
        let first = timed("event-1", day, 9, 10, Some("10"));
        let mut recolored = first.clone();
        recolored.color_id = Some("11".to_string());

        db.upsert_events(&[first]).unwrap();
        db.upsert_events(&[recolored]).unwrap();

        assert_eq!(db.event_count().unwrap(), 1);
        let (start, end) = day_range(day);
        let events = db.list_events_in_range(start, end).unwrap();
        assert_eq!(events[0].color_id.as_deref(), Some("11"));
    }

    #[test]
    fn events_roundtrip_through_storage() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let day = date(2025, 1, 29);
        let events = vec![full_day("all-day", day), timed("timed", day, 9, 11, Some("5"))];

        assert_eq!(db.upsert_events(&events).unwrap(), 2);

        let (start, end) = day_range(day);
        let stored = db.list_events_in_range(start, end).unwrap();
        assert_eq!(stored, events);
    }

    #[test]
    fn list_events_in_range_selects_day() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let day = date(2025, 1, 29);
        db.upsert_events(&[
            timed("late", day, 15, 16, None),
            timed("early", day, 8, 9, None),
            timed("backwards", day, 12, 11, None),
            timed("previous", date(2025, 1, 28), 8, 9, None),
            timed("next", date(2025, 1, 30), 8, 9, None),
            full_day("yesterday-all-day", date(2025, 1, 28)),
        ])
        .unwrap();

        let (start, end) = day_range(day);
        let ids: Vec<_> = db
            .list_events_in_range(start, end)
            .unwrap()
            .into_iter()
            .map(|event| event.id)
            .collect();

        assert_eq!(ids, vec!["early", "backwards", "late"]);
    }

    #[test]
    fn overnight_event_belongs_to_both_days() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let event = CalendarEvent {
            id: "overnight".to_string(),
            summary: String::new(),
            start: EventTime::DateTime(instant(date(2025, 1, 28), 23, 0)),
            end: EventTime::DateTime(instant(date(2025, 1, 29), 1, 0)),
            color_id: None,
        };
        db.upsert_events(&[event]).unwrap();

        for day in [date(2025, 1, 28), date(2025, 1, 29)] {
            let (start, end) = day_range(day);
            assert_eq!(db.list_events_in_range(start, end).unwrap().len(), 1);
        }
    }

    #[test]
    fn stored_range_spans_all_events() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        assert!(db.stored_range().unwrap().is_none());

        db.upsert_events(&[
            timed("a", date(2025, 1, 3), 9, 10, None),
            full_day("b", date(2025, 1, 20)),
        ])
        .unwrap();

        let (first, last) = db.stored_range().unwrap().unwrap();
        assert_eq!(first, instant(date(2025, 1, 3), 9, 0));
        assert_eq!(last, instant(date(2025, 1, 21), 0, 0));
    }

    #[test]
    fn corrupt_boundary_is_reported() {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.conn
            .execute(
                "INSERT INTO calendar_events
                 (id, summary, start_value, end_value, all_day, color_id, range_start, range_end, imported_at)
                 VALUES ('bad', '', 'not-a-dateTtime', '2025-01-29', 0, NULL,
                         '2025-01-29T09:00:00.000Z', '2025-01-29T10:00:00.000Z', '2025-01-29T00:00:00.000Z')",
                [],
            )
            .unwrap();

        let (start, end) = day_range(date(2025, 1, 29));
        let err = db.list_events_in_range(start, end).unwrap_err();
        assert!(matches!(err, DbError::TimestampParse { ref event_id, .. } if event_id == "bad"));
    }

    #[test]
    fn database_is_an_event_source() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ct.db");
        let day = date(2025, 1, 29);
        {
            let mut db = Database::open(&path).unwrap();
            db.upsert_events(&[timed("a", day, 9, 10, Some("10"))]).unwrap();
        }

        let db = Database::open(&path).unwrap();
        let (start, end) = day_range(day);
        let events = db.fetch_events(start, end).unwrap();
        assert_eq!(events.len(), 1);
    }
}
