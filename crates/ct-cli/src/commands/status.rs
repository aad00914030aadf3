//! Status command for verifying setup: configuration, database and mapping.

use std::io::Write;

use anyhow::{Context, Result};

use ct_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let categories = config.category_config();

    writeln!(writer, "Calendar tracker status")?;
    match categories.validate() {
        Ok(()) => writeln!(writer, "Config: ok")?,
        Err(e) => writeln!(writer, "Config: invalid ({e})")?,
    }
    writeln!(writer, "Database: {}", config.database_path.display())?;

    if config.database_path.exists() {
        let db = Database::open(&config.database_path)
            .with_context(|| format!("failed to open {}", config.database_path.display()))?;
        writeln!(writer, "Events stored: {}", db.event_count()?)?;
        match db.stored_range()? {
            Some((first, last)) => writeln!(
                writer,
                "Stored range: {} .. {}",
                first.format("%Y-%m-%d %H:%M"),
                last.format("%Y-%m-%d %H:%M")
            )?,
            None => writeln!(writer, "Stored range: (empty)")?,
        }
    } else {
        writeln!(writer, "Events stored: 0 (run 'ct import' to create the database)")?;
    }

    writeln!(writer, "Categories:")?;
    for (color, category) in &categories.table.colors {
        write_mapping(writer, color, category, categories.deep_work.contains(category))?;
    }
    if let Some(category) = &categories.table.untagged {
        write_mapping(
            writer,
            "(untagged)",
            category,
            categories.deep_work.contains(category),
        )?;
    }

    Ok(())
}

fn write_mapping<W: Write>(writer: &mut W, color: &str, category: &str, deep: bool) -> Result<()> {
    let marker = if deep { " [deep work]" } else { "" };
    writeln!(writer, "- {color:<10} -> {category}{marker}")?;
    Ok(())
}
