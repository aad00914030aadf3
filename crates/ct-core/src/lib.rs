//! Core domain logic for calendar time tracking.
//!
//! This crate contains the categorization and aggregation engine:
//! - Categorization: mapping event color tags to categories and deep work
//! - Daily metrics: per-category hours with unaccounted time gap-filled
//! - Period metrics: weekly and monthly roll-ups
//! - Windowed averages: seven-day chunk means for the monthly view
//!
//! Events come from an [`EventSource`]; the engine performs no I/O itself.

pub mod category;
mod error;
pub mod event;
pub mod metrics;
pub mod period;
mod source;
mod tracker;
pub mod window;

pub use category::{
    CHORES_AND_MISC, CategoryConfig, CategoryTable, Categorizer, DeepWorkSet, UNCATEGORIZED,
};
pub use error::{ConfigError, CoreError, TrackerError};
pub use event::{CalendarEvent, EventTime, FULL_DAY_HOURS, duration_hours};
pub use metrics::{CategoryHours, DailyMetrics, aggregate_day};
pub use period::{PeriodId, PeriodMetrics, aggregate_period};
pub use source::{EventSource, SourceError, VecSource};
pub use tracker::{CategorizedEvent, TimeTracker, day_window};
pub use window::{WindowChunk, WindowedSummary, round_hours, summarize_month, windowed_averages};
