//! Logs command - view recent application log entries

use anyhow::Result;
use chrono::{TimeZone, Utc};

use moneta_core::{EntryPoint, LoggingService};

use super::get_moneta_dir;
use crate::output;

fn get_logging_service() -> Result<LoggingService> {
    let moneta_dir = get_moneta_dir();
    LoggingService::new(&moneta_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(limit: usize, json: bool) -> Result<()> {
    let service = get_logging_service()?;
    let entries = service.recent(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No log entries found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Entry", "Event", "Command", "Error"]);
    for entry in &entries {
        table.add_row(vec![
            format_timestamp(entry.timestamp),
            entry.entry_point.clone(),
            entry.event.event.clone(),
            entry.event.command.clone().unwrap_or_default(),
            entry.event.error_message.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
    println!("\nLog file: {}", service.log_path().display());

    Ok(())
}
