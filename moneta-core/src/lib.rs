//! Moneta Core - transaction engine for a multi-bank retail ledger
//!
//! This crate implements the engine behind the CLI:
//!
//! - **domain**: entities and state machines (Bank, Account, Ledger,
//!   Currency) with the fixed fee and rate tables
//! - **ports**: trait seams for injectable dependencies (IBAN issuance)
//! - **services**: orchestration (bank registry, transfer coordinator,
//!   operation logging)
//! - **adapters**: JSON snapshot persistence

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;

use anyhow::Result;

use adapters::snapshot::SnapshotStore;
use config::Config;
use ports::iban::RandomIbanGenerator;
use services::registry::BankRegistry;
use services::transfer::TransferCoordinator;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Account, AccountType, Bank, BankCountry, BankLocation, Currency, Transaction, TransactionKind};
pub use services::{
    BankRef, DelayProfile, EntryPoint, LogEntry, LogEvent, LoggingService, TransferReceipt,
};

/// Snapshot file name under the data directory.
const SNAPSHOT_FILE: &str = "banks.json";

/// Main context for engine operations
///
/// This is the primary entry point for callers. It holds the
/// configuration, the bank registry restored from the snapshot, and
/// the transfer coordinator wired to the configured delay profile.
pub struct MonetaContext {
    pub config: Config,
    pub registry: BankRegistry,
    pub transfers: TransferCoordinator,
    store: SnapshotStore,
}

impl MonetaContext {
    /// Create a new context rooted at `data_dir`. A missing or corrupt
    /// snapshot starts with an empty bank list.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let store = SnapshotStore::new(data_dir.join(SNAPSHOT_FILE));
        let banks = store.load();
        let registry = BankRegistry::with_banks(banks, Box::new(RandomIbanGenerator::new()));
        let transfers = TransferCoordinator::new(config.transfer_delays.clone());

        Ok(Self {
            config,
            registry,
            transfers,
            store,
        })
    }

    /// Persist the current bank list. A failed save leaves both the
    /// in-memory state and the previous snapshot content intact as far
    /// as the engine is concerned; callers decide how loudly to warn.
    pub fn save(&self) -> domain::result::Result<()> {
        let mut banks = Vec::with_capacity(self.registry.banks().len());
        for bank in self.registry.banks() {
            banks.push(bank.lock()?.clone());
        }
        self.store.save(&banks, self.config.persist_ledgers)
    }
}
