//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Calendar time tracker.
///
/// Categorizes calendar events by color and reports daily, weekly and
/// monthly time usage, including deep work and unaccounted time.
#[derive(Debug, Parser)]
#[command(name = "ct", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Read events from a JSON Lines file instead of the database.
    #[arg(long, global = true, value_name = "FILE")]
    pub events: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import calendar events (JSON Lines on stdin) into the database.
    Import,

    /// Report metrics for a single day.
    Day {
        /// Date as YYYY-MM-DD, "today", "yesterday" or "N days ago".
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report metrics for a week.
    Week {
        /// Any date in the week (snapped back to Monday unless --exact).
        date: Option<String>,

        /// Start the week on DATE itself.
        #[arg(long)]
        exact: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report metrics for a month.
    Month {
        /// Month as YYYY-MM (defaults to the current month).
        month: Option<String>,

        /// Show seven-day windowed averages instead of totals.
        #[arg(long)]
        windows: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List a day's events with their color ids and categories.
    Events {
        /// Date as YYYY-MM-DD, "today", "yesterday" or "N days ago".
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Verify configuration and show what is stored.
    Status,
}
