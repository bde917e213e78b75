//! JSON snapshot persistence
//!
//! The full bank list serializes into a single pretty-printed JSON
//! document. Ledgers are excluded by default and rebuilt empty per
//! account on load; the `persistLedgers` setting carries them in the
//! file instead. A missing or unreadable snapshot loads as an empty
//! bank list - the engine starts fresh rather than refusing to start.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::account::Account;
use crate::domain::bank::{Bank, BankCountry, BankLocation};
use crate::domain::ledger::Ledger;
use crate::domain::result::Result;

/// On-disk shape of one bank.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankSnapshot {
    name: String,
    swift: String,
    location: BankLocation,
    country: BankCountry,
    fee_revenue: Decimal,
    accounts: Vec<Account>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ledgers: Option<HashMap<String, Ledger>>,
}

impl BankSnapshot {
    fn capture(bank: &Bank, include_ledgers: bool) -> Self {
        Self {
            name: bank.name.clone(),
            swift: bank.swift.clone(),
            location: bank.location,
            country: bank.country,
            fee_revenue: bank.fee_revenue,
            accounts: bank.accounts().to_vec(),
            ledgers: include_ledgers.then(|| bank.ledgers().clone()),
        }
    }

    fn restore(self) -> Bank {
        Bank::from_parts(
            self.name,
            self.swift,
            self.location,
            self.country,
            self.fee_revenue,
            self.accounts,
            self.ledgers.unwrap_or_default(),
        )
    }
}

/// Snapshot file handle with load/save contracts.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fail-soft load: a missing or corrupt snapshot yields an empty
    /// bank list.
    pub fn load(&self) -> Vec<Bank> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        let snapshots: Vec<BankSnapshot> = serde_json::from_str(&content).unwrap_or_default();
        snapshots.into_iter().map(BankSnapshot::restore).collect()
    }

    /// Write the snapshot. Errors are returned to the caller; in-memory
    /// state is never affected by a failed save.
    pub fn save(&self, banks: &[Bank], persist_ledgers: bool) -> Result<()> {
        let snapshots: Vec<BankSnapshot> = banks
            .iter()
            .map(|b| BankSnapshot::capture(b, persist_ledgers))
            .collect();
        let json = serde_json::to_string_pretty(&snapshots)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
