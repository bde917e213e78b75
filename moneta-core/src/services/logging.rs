//! Logging service - structured event logging to JSON lines
//!
//! Privacy-safe operation log appended to `logs/events.jsonl` under the
//! data directory. No user data (balances, holders, IBANs) is ever
//! logged; only operation names and error messages.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    // Lower 48 bits of timestamp, 16-bit counter for uniqueness within
    // the same millisecond.
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Get current unix timestamp in milliseconds
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Detect the current platform
fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            error_message: None,
        }
    }

    /// Set the command context
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A log entry as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    #[serde(flatten)]
    pub event: LogEvent,
}

/// Service for structured event logging
pub struct LoggingService {
    file: Mutex<File>,
    log_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    pub fn new(data_dir: &Path, entry_point: EntryPoint, app_version: &str) -> Result<Self> {
        let log_dir = data_dir.join("logs");
        fs::create_dir_all(&log_dir)?;
        let log_path = log_dir.join("events.jsonl");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            file: Mutex::new(file),
            log_path,
            entry_point,
            app_version: app_version.to_string(),
            platform: detect_platform(),
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Append an event. Each entry is one JSON line.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let entry = LogEntry {
            id: generate_id(),
            timestamp: now_ms(),
            entry_point: self.entry_point.as_str().to_string(),
            app_version: self.app_version.clone(),
            platform: self.platform.to_string(),
            event,
        };

        let mut file = self
            .file
            .lock()
            .map_err(|e| anyhow!("log file lock poisoned: {e}"))?;
        serde_json::to_writer(&mut *file, &entry)?;
        writeln!(file)?;
        Ok(())
    }

    /// The most recent `limit` entries, oldest first. Unparseable lines
    /// are skipped rather than failing the whole read.
    pub fn recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let reader = BufReader::new(File::open(&self.log_path)?);
        let entries: Vec<LogEntry> = reader
            .lines()
            .filter_map(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        let start = entries.len().saturating_sub(limit);
        Ok(entries[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn log_and_read_back() {
        let dir = TempDir::new().unwrap();
        let logger = LoggingService::new(dir.path(), EntryPoint::Cli, "0.1.0").unwrap();

        logger.log(LogEvent::new("bank_created").with_command("bank new")).unwrap();
        logger
            .log(LogEvent::new("withdraw_failed").with_error("Insufficient funds"))
            .unwrap();

        let entries = logger.recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.event, "bank_created");
        assert_eq!(entries[0].event.command.as_deref(), Some("bank new"));
        assert_eq!(
            entries[1].event.error_message.as_deref(),
            Some("Insufficient funds")
        );
        assert_eq!(entries[0].entry_point, "cli");
    }

    #[test]
    fn recent_honors_the_limit() {
        let dir = TempDir::new().unwrap();
        let logger = LoggingService::new(dir.path(), EntryPoint::Cli, "0.1.0").unwrap();
        for i in 0..5 {
            logger.log(LogEvent::new(format!("event_{i}"))).unwrap();
        }

        let entries = logger.recent(2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.event, "event_3");
        assert_eq!(entries[1].event.event, "event_4");
    }

    #[test]
    fn ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }
}
