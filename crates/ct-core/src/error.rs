//! Error types for the aggregation engine.

use thiserror::Error;

use crate::source::SourceError;

/// Invalid calendar arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The month is outside `1..=12` or the year is out of range.
    #[error("invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    /// A date computation overflowed the supported calendar range.
    #[error("date out of range: {0}")]
    DateOutOfRange(String),

    /// Windowed averages were requested for a non-monthly period.
    #[error("windowed averages are only defined for monthly periods")]
    NotAMonth,
}

/// Invalid category configuration. Fatal at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The category table maps nothing.
    #[error("category table is empty")]
    EmptyTable,

    /// A color key is blank.
    #[error("category table contains a blank color id")]
    BlankColor,

    /// A color maps to a blank category name.
    #[error("color {color} maps to a blank category name")]
    BlankCategory { color: String },
}

/// Errors returned by [`TimeTracker`](crate::TimeTracker) operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to fetch events: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
