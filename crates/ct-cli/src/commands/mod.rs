//! CLI subcommand implementations.

pub mod events;
pub mod import;
pub mod report;
pub mod status;
pub mod util;
