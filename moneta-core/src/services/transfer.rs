//! Cross-bank and intra-bank transfer protocol
//!
//! A transfer runs in three phases:
//!
//! 1. **Validate** - both accounts are resolved and the source balance
//!    is checked against amount plus fee, under the bank lock(s).
//! 2. **Latency** - a simulated processing delay (`tokio::time::sleep`)
//!    with no locks held. Dropping the future here cancels the transfer
//!    with zero side effects, since nothing has been mutated yet.
//! 3. **Commit** - the locks are re-acquired in bank-id order, both
//!    legs are re-validated (funds may have moved during the delay),
//!    and only then are debit, conversion, credit, fee and both ledger
//!    entries applied as one unit.
//!
//! Callers that want a deadline wrap the returned future in
//! `tokio::time::timeout`; a timed-out transfer moves no funds.

use std::sync::{Arc, MutexGuard};
use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::bank::Bank;
use crate::domain::currency::{self, Currency};
use crate::domain::result::{Error, Result};
use crate::services::registry::BankRef;

/// Latency bounds per transfer class, in milliseconds (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayProfile {
    pub same_bank_ms: (u64, u64),
    pub cross_bank_ms: (u64, u64),
}

impl Default for DelayProfile {
    /// Same-bank transfers take 1-10 s, cross-bank 11-20 s.
    fn default() -> Self {
        Self {
            same_bank_ms: (1_000, 10_000),
            cross_bank_ms: (11_000, 20_000),
        }
    }
}

impl DelayProfile {
    /// No simulated latency (CI, tests).
    pub fn none() -> Self {
        Self {
            same_bank_ms: (0, 0),
            cross_bank_ms: (0, 0),
        }
    }

    fn sample(&self, same_bank: bool) -> Duration {
        let (lo, hi) = if same_bank {
            self.same_bank_ms
        } else {
            self.cross_bank_ms
        };
        if hi == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }
}

/// Outcome of a committed transfer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub from_iban: String,
    pub to_iban: String,
    pub amount: Decimal,
    pub source_currency: Currency,
    pub fee: Decimal,
    pub credited: Decimal,
    pub destination_currency: Currency,
    pub same_bank: bool,
    pub delay_ms: u64,
}

/// Orchestrates transfers between accounts, possibly across two banks.
#[derive(Debug, Clone)]
pub struct TransferCoordinator {
    delays: DelayProfile,
}

impl TransferCoordinator {
    pub fn new(delays: DelayProfile) -> Self {
        Self { delays }
    }

    /// Fee schedule: 1% within a bank, 3% across banks.
    fn fee_rate(same_bank: bool) -> Decimal {
        if same_bank {
            Decimal::new(1, 2)
        } else {
            Decimal::new(3, 2)
        }
    }

    /// Move `amount` (in the source account's currency) from
    /// `from_iban` to `to_iban`. `destination` defaults to the source
    /// bank when absent or equal to it.
    pub async fn transfer(
        &self,
        source: &BankRef,
        destination: Option<&BankRef>,
        from_iban: &str,
        to_iban: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt> {
        let destination = destination.filter(|d| !Arc::ptr_eq(d, source));
        let same_bank = destination.is_none();

        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        let fee = amount * Self::fee_rate(same_bank);

        // Phase 1: both legs must validate before the delay even starts,
        // so a bad destination can never cost the source anything.
        match destination {
            None => {
                let bank = source.lock()?;
                let source_currency = bank.prepare_transfer_out(from_iban, amount, fee)?;
                let destination_currency = bank.prepare_transfer_in(to_iban)?;
                credited_amount(amount, source_currency, destination_currency)?;
            }
            Some(dest) => {
                let (src, dst) = lock_pair(source, dest)?;
                let source_currency = src.prepare_transfer_out(from_iban, amount, fee)?;
                let destination_currency = dst.prepare_transfer_in(to_iban)?;
                credited_amount(amount, source_currency, destination_currency)?;
            }
        }

        // Phase 2: simulated processing latency. No locks held.
        let delay = self.delays.sample(same_bank);
        tokio::time::sleep(delay).await;

        // Phase 3: re-validate and commit under the locks. All reads
        // precede the first write, so a failure here mutates nothing.
        let (source_currency, destination_currency, credited) = match destination {
            None => {
                let mut bank = source.lock()?;
                let source_currency = bank.prepare_transfer_out(from_iban, amount, fee)?;
                let destination_currency = bank.prepare_transfer_in(to_iban)?;
                let credited = credited_amount(amount, source_currency, destination_currency)?;
                bank.commit_transfer_out(from_iban, to_iban, amount, fee)?;
                bank.commit_transfer_in(to_iban, credited, from_iban, None)?;
                (source_currency, destination_currency, credited)
            }
            Some(dest) => {
                let (mut src, mut dst) = lock_pair(source, dest)?;
                let source_currency = src.prepare_transfer_out(from_iban, amount, fee)?;
                let destination_currency = dst.prepare_transfer_in(to_iban)?;
                let credited = credited_amount(amount, source_currency, destination_currency)?;
                let source_bank_name = src.name.clone();
                src.commit_transfer_out(from_iban, to_iban, amount, fee)?;
                dst.commit_transfer_in(to_iban, credited, from_iban, Some(&source_bank_name))?;
                (source_currency, destination_currency, credited)
            }
        };

        Ok(TransferReceipt {
            from_iban: from_iban.to_string(),
            to_iban: to_iban.to_string(),
            amount,
            source_currency,
            fee,
            credited,
            destination_currency,
            same_bank,
            delay_ms: delay.as_millis() as u64,
        })
    }
}

/// Convert the transfer amount into the destination currency. An
/// amount so small it rounds to zero on the destination side cannot be
/// credited, so the transfer is rejected whole before any leg commits.
fn credited_amount(amount: Decimal, from: Currency, to: Currency) -> Result<Decimal> {
    let credited = currency::convert(amount, from, to);
    if credited <= Decimal::ZERO {
        return Err(Error::InvalidAmount(credited));
    }
    Ok(credited)
}

/// Lock two distinct banks in id order and hand the guards back in
/// argument order.
fn lock_pair<'a>(
    a: &'a BankRef,
    b: &'a BankRef,
) -> Result<(MutexGuard<'a, Bank>, MutexGuard<'a, Bank>)> {
    if a.id() <= b.id() {
        let ga = a.lock()?;
        let gb = b.lock()?;
        Ok((ga, gb))
    } else {
        let gb = b.lock()?;
        let ga = a.lock()?;
        Ok((ga, gb))
    }
}
