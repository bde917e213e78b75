//! Append-only per-account transaction log

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::currency::Currency;

/// Ledger entry tag, serialized as the SCREAMING_SNAKE wire tags of
/// the snapshot format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    AccountOpen,
    AccountClose,
    Deposit,
    Withdrawal,
    TransferOut,
    TransferIn,
    LocationChange,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TransactionKind::AccountOpen => "ACCOUNT_OPEN",
            TransactionKind::AccountClose => "ACCOUNT_CLOSE",
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::TransferOut => "TRANSFER_OUT",
            TransactionKind::TransferIn => "TRANSFER_IN",
            TransactionKind::LocationChange => "LOCATION_CHANGE",
        };
        f.write_str(tag)
    }
}

/// A single ledger entry. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    /// Signed: debits are negative.
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        currency: Currency,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            amount,
            currency,
            description: description.into(),
        }
    }
}

/// Append-only log: entries can be recorded and read, never edited or
/// removed. Insertion order is the only order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    pub fn record(&mut self, entry: Transaction) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_insertion_order() {
        let mut ledger = Ledger::default();
        ledger.record(Transaction::new(
            TransactionKind::AccountOpen,
            Decimal::new(100, 0),
            Currency::RON,
            "Account opened with initial deposit",
        ));
        ledger.record(Transaction::new(
            TransactionKind::Withdrawal,
            Decimal::new(-50, 0),
            Currency::RON,
            "Withdrew 50, fee 0.25",
        ));

        let kinds: Vec<_> = ledger.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![TransactionKind::AccountOpen, TransactionKind::Withdrawal]
        );
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn kind_serializes_as_wire_tag() {
        let json = serde_json::to_string(&TransactionKind::TransferOut).unwrap();
        assert_eq!(json, "\"TRANSFER_OUT\"");
        let kind: TransactionKind = serde_json::from_str("\"ACCOUNT_CLOSE\"").unwrap();
        assert_eq!(kind, TransactionKind::AccountClose);
    }
}
