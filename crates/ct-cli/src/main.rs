use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ct_core::{EventSource, TimeTracker, VecSource};
use ct_db::Database;

use ct_cli::commands::{events, import, report, status, util};
use ct_cli::{Cli, Commands, Config};

/// Open the database, ensuring the parent directory exists.
fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path).context("failed to open database")
}

/// The event source for report commands: `--events FILE` or the database.
fn open_source(cli: &Cli, config: &Config) -> Result<Box<dyn EventSource>> {
    if let Some(path) = &cli.events {
        let events = import::load_events_file(path)?;
        tracing::debug!(count = events.len(), path = %path.display(), "loaded events file");
        return Ok(Box::new(VecSource::new(events)));
    }
    Ok(Box::new(open_database(config)?))
}

/// Build a tracker over the selected source and run a report with it.
fn with_tracker(
    cli: &Cli,
    config: &Config,
    report: impl FnOnce(&TimeTracker<&dyn EventSource>) -> Result<String>,
) -> Result<String> {
    let boxed = open_source(cli, config)?;
    let source: &dyn EventSource = &*boxed;
    let tracker = TimeTracker::new(source, config.category_config())
        .context("invalid category configuration")?;
    report(&tracker)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let today = util::today();
    let output = match command {
        Commands::Import => {
            if cli.events.is_some() {
                tracing::warn!("--events is ignored by import; reading stdin");
            }
            let mut db = open_database(&config)?;
            let count = import::run(&mut db)?;
            eprintln!("Imported {count} events");
            return Ok(());
        }
        Commands::Status => {
            status::run(&mut std::io::stdout().lock(), &config)?;
            return Ok(());
        }
        Commands::Day { date, json } => {
            let date = util::parse_date_or_today(date.as_deref(), today)?;
            with_tracker(&cli, &config, |tracker| report::run_day(tracker, date, *json))?
        }
        Commands::Week { date, exact, json } => {
            let date = util::parse_date_or_today(date.as_deref(), today)?;
            let start = if *exact { date } else { util::monday_of(date) };
            with_tracker(&cli, &config, |tracker| report::run_week(tracker, start, *json))?
        }
        Commands::Month {
            month,
            windows,
            json,
        } => {
            let (year, month) = match month {
                Some(month) => util::parse_month(month)?,
                None => (today.year(), today.month()),
            };
            with_tracker(&cli, &config, |tracker| {
                report::run_month(tracker, year, month, *windows, *json)
            })?
        }
        Commands::Events { date, json } => {
            let date = util::parse_date_or_today(date.as_deref(), today)?;
            with_tracker(&cli, &config, |tracker| events::run(tracker, date, *json))?
        }
    };

    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}
