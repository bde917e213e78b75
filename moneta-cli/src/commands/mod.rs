//! CLI command implementations

pub mod account;
pub mod bank;
pub mod history;
pub mod logs;
pub mod money;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use moneta_core::{BankRef, EntryPoint, LogEvent, LoggingService, MonetaContext};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let moneta_dir = get_moneta_dir();
    // Ensure directory exists
    std::fs::create_dir_all(&moneta_dir).ok()?;
    LoggingService::new(&moneta_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the moneta directory from environment or default
pub fn get_moneta_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MONETA_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".moneta")
    }
}

/// Get or create the engine context
pub fn get_context() -> Result<MonetaContext> {
    let moneta_dir = get_moneta_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&moneta_dir)
        .with_context(|| format!("Failed to create moneta directory: {:?}", moneta_dir))?;

    MonetaContext::new(&moneta_dir).context("Failed to initialize moneta context")
}

/// Persist the bank snapshot after a mutating command
pub fn save_context(ctx: &MonetaContext) -> Result<()> {
    ctx.save().context("Failed to write bank snapshot")
}

/// Locate the bank holding an IBAN, failing with a user-facing message
pub fn require_account_bank(ctx: &MonetaContext, iban: &str) -> Result<BankRef> {
    ctx.registry
        .find_account_bank(iban)?
        .with_context(|| format!("No account with IBAN {} at any bank", iban))
}
