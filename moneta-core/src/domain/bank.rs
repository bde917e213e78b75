//! Bank aggregate: accounts, fee schedules, per-account ledgers

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::{Account, AccountType};
use crate::domain::currency::{self, Currency};
use crate::domain::ledger::{Ledger, Transaction, TransactionKind};
use crate::domain::result::{Error, Result};
use crate::ports::iban::IbanGenerator;

/// Branch region codes. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankLocation {
    TM,
    AR,
    B,
    CT,
    IS,
    CJ,
    TL,
    BR,
    BV,
    DB,
}

/// Country codes a bank can be registered in. Closed set; the code is
/// the IBAN prefix for accounts the bank issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BankCountry {
    RO,
    HU,
    DE,
    GB,
    FR,
    IT,
    ES,
    PL,
}

impl fmt::Display for BankLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for BankLocation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TM" => Ok(BankLocation::TM),
            "AR" => Ok(BankLocation::AR),
            "B" => Ok(BankLocation::B),
            "CT" => Ok(BankLocation::CT),
            "IS" => Ok(BankLocation::IS),
            "CJ" => Ok(BankLocation::CJ),
            "TL" => Ok(BankLocation::TL),
            "BR" => Ok(BankLocation::BR),
            "BV" => Ok(BankLocation::BV),
            "DB" => Ok(BankLocation::DB),
            other => Err(format!("unknown bank location: {other}")),
        }
    }
}

impl fmt::Display for BankCountry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for BankCountry {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RO" => Ok(BankCountry::RO),
            "HU" => Ok(BankCountry::HU),
            "DE" => Ok(BankCountry::DE),
            "GB" => Ok(BankCountry::GB),
            "FR" => Ok(BankCountry::FR),
            "IT" => Ok(BankCountry::IT),
            "ES" => Ok(BankCountry::ES),
            "PL" => Ok(BankCountry::PL),
            other => Err(format!("unknown bank country: {other}")),
        }
    }
}

/// A bank: an ordered collection of accounts (open order), the fee
/// schedule, and one append-only ledger per IBAN.
///
/// The bank mutates only its own accounts and ledgers. Transfers reach
/// into another bank exclusively through the narrow
/// `prepare_transfer_in` / `commit_transfer_in` capabilities driven by
/// the transfer coordinator.
#[derive(Debug, Clone)]
pub struct Bank {
    /// Process-local identity used for lock ordering. Not persisted;
    /// the durable key is `(name, country)`.
    pub id: Uuid,
    pub name: String,
    pub swift: String,
    pub location: BankLocation,
    pub country: BankCountry,
    /// Aggregate fee revenue, accumulated at face value.
    pub fee_revenue: Decimal,
    accounts: Vec<Account>,
    ledgers: HashMap<String, Ledger>,
}

impl Bank {
    pub fn new(
        name: impl Into<String>,
        swift: impl Into<String>,
        location: BankLocation,
        country: BankCountry,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            swift: swift.into(),
            location,
            country,
            fee_revenue: Decimal::ZERO,
            accounts: Vec::new(),
            ledgers: HashMap::new(),
        }
    }

    /// Rebuild a bank from persisted parts. Accounts with no persisted
    /// ledger get a fresh empty one.
    pub(crate) fn from_parts(
        name: String,
        swift: String,
        location: BankLocation,
        country: BankCountry,
        fee_revenue: Decimal,
        accounts: Vec<Account>,
        mut ledgers: HashMap<String, Ledger>,
    ) -> Self {
        for account in &accounts {
            ledgers.entry(account.iban.clone()).or_default();
        }
        Self {
            id: Uuid::new_v4(),
            name,
            swift,
            location,
            country,
            fee_revenue,
            accounts,
            ledgers,
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub(crate) fn ledgers(&self) -> &HashMap<String, Ledger> {
        &self.ledgers
    }

    pub fn active_account_count(&self) -> usize {
        self.accounts.iter().filter(|a| a.is_active()).count()
    }

    /// Look up an account regardless of lifecycle status (for display).
    pub fn find_account(&self, iban: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.iban == iban)
    }

    fn active_account(&self, iban: &str) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.iban == iban && a.is_active())
            .ok_or_else(|| Error::not_found(format!("no active account with IBAN {iban}")))
    }

    fn active_account_mut(&mut self, iban: &str) -> Result<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.iban == iban && a.is_active())
            .ok_or_else(|| Error::not_found(format!("no active account with IBAN {iban}")))
    }

    fn record(
        &mut self,
        iban: &str,
        kind: TransactionKind,
        amount: Decimal,
        currency: Currency,
        description: String,
    ) {
        self.ledgers
            .entry(iban.to_string())
            .or_default()
            .record(Transaction::new(kind, amount, currency, description));
    }

    // === Account lifecycle ===

    /// Open a new account with a freshly issued IBAN and record the
    /// initial deposit in its ledger. Returns the IBAN.
    pub fn open_account(
        &mut self,
        holder: impl Into<String>,
        account_type: AccountType,
        currency: Currency,
        initial_deposit: Decimal,
        iban_gen: &mut dyn IbanGenerator,
    ) -> Result<String> {
        if initial_deposit < Decimal::ZERO {
            return Err(Error::InvalidAmount(initial_deposit));
        }

        let iban = iban_gen.next_iban(self.country, &self.swift);
        self.accounts.push(Account::new(
            holder,
            account_type,
            currency,
            iban.clone(),
            initial_deposit,
        ));
        self.ledgers.insert(iban.clone(), Ledger::default());
        self.record(
            &iban,
            TransactionKind::AccountOpen,
            initial_deposit,
            currency,
            "Account opened with initial deposit".to_string(),
        );
        Ok(iban)
    }

    /// Close an account. Only permitted with a zero balance; closing is
    /// terminal, the IBAN no longer resolves for money operations.
    pub fn close_account(&mut self, iban: &str) -> Result<()> {
        let account = self.active_account_mut(iban)?;
        if account.balance > Decimal::ZERO {
            return Err(Error::NonZeroBalance {
                balance: account.balance,
                currency: account.currency,
            });
        }

        let currency = account.currency;
        account.close();
        self.record(
            iban,
            TransactionKind::AccountClose,
            Decimal::ZERO,
            currency,
            "Account closed".to_string(),
        );
        Ok(())
    }

    // === Money movement ===

    /// Deposit cash into an account, converting into the account's
    /// currency when they differ. Returns the credited amount.
    pub fn deposit_money(
        &mut self,
        iban: &str,
        amount: Decimal,
        cash_currency: Currency,
    ) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }

        let account = self.active_account_mut(iban)?;
        let credited = currency::convert(amount, cash_currency, account.currency);
        account.deposit(credited)?;
        let account_currency = account.currency;

        self.record(
            iban,
            TransactionKind::Deposit,
            credited,
            account_currency,
            format!("Deposited {amount} {cash_currency}"),
        );
        Ok(credited)
    }

    /// Withdraw from an account. A type-dependent fee is debited on top
    /// of the amount and credited to the bank's fee revenue. Returns
    /// the fee charged.
    pub fn withdraw_money(&mut self, iban: &str, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }

        let account = self.active_account_mut(iban)?;
        let fee = amount * account.account_type.withdrawal_fee_rate();
        let total = amount + fee;
        if account.balance < total {
            return Err(Error::insufficient_funds(format!(
                "withdrawal of {} plus {} fee exceeds balance {} {}",
                amount, fee, account.balance, account.currency
            )));
        }

        account.withdraw(total)?;
        let account_currency = account.currency;
        self.fee_revenue += fee;
        self.record(
            iban,
            TransactionKind::Withdrawal,
            -amount,
            account_currency,
            format!("Withdrew {amount}, fee {fee}"),
        );
        Ok(fee)
    }

    /// Re-denominate an account (2% fee, charged before conversion).
    /// Returns the new balance.
    pub fn change_account_currency(
        &mut self,
        iban: &str,
        new_currency: Currency,
    ) -> Result<Decimal> {
        self.active_account_mut(iban)?.change_currency(new_currency)
    }

    /// Record a location change. Informational; no balance movement.
    pub fn change_account_location(
        &mut self,
        iban: &str,
        new_location: BankLocation,
    ) -> Result<()> {
        let currency = self.active_account(iban)?.currency;
        self.record(
            iban,
            TransactionKind::LocationChange,
            Decimal::ZERO,
            currency,
            format!("Location changed to {new_location}"),
        );
        Ok(())
    }

    /// The ledger for an IBAN, or empty for IBANs this bank never saw.
    pub fn transaction_history(&self, iban: &str) -> &[Transaction] {
        self.ledgers.get(iban).map(Ledger::entries).unwrap_or(&[])
    }

    // === Transfer capabilities (coordinator only) ===
    //
    // All `prepare_*` calls are read-only; `commit_*` calls cannot fail
    // once the matching `prepare_*` succeeded under the same lock, which
    // is what makes the coordinator's commit phase a single logical unit.

    /// Validate the outgoing leg: active source, positive amount, and a
    /// balance covering amount plus fee. Returns the source currency.
    pub(crate) fn prepare_transfer_out(
        &self,
        iban: &str,
        amount: Decimal,
        fee: Decimal,
    ) -> Result<Currency> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        let account = self.active_account(iban)?;
        let total = amount + fee;
        if account.balance < total {
            return Err(Error::insufficient_funds(format!(
                "transfer of {} plus {} fee exceeds balance {} {}",
                amount, fee, account.balance, account.currency
            )));
        }
        Ok(account.currency)
    }

    /// Validate the incoming leg. Returns the destination currency.
    pub(crate) fn prepare_transfer_in(&self, iban: &str) -> Result<Currency> {
        Ok(self.active_account(iban)?.currency)
    }

    /// Debit the source by amount plus fee, credit the fee to revenue,
    /// and record the TRANSFER_OUT leg.
    pub(crate) fn commit_transfer_out(
        &mut self,
        iban: &str,
        to_iban: &str,
        amount: Decimal,
        fee: Decimal,
    ) -> Result<()> {
        let currency = self.prepare_transfer_out(iban, amount, fee)?;
        self.active_account_mut(iban)?.withdraw(amount + fee)?;
        self.fee_revenue += fee;
        self.record(
            iban,
            TransactionKind::TransferOut,
            -amount,
            currency,
            format!("Transfer to {to_iban}, fee {fee}"),
        );
        Ok(())
    }

    /// Credit the destination with an already-converted amount and
    /// record the TRANSFER_IN leg. `from_bank` is set on cross-bank
    /// transfers so the entry names the sending bank.
    pub(crate) fn commit_transfer_in(
        &mut self,
        iban: &str,
        amount: Decimal,
        from_iban: &str,
        from_bank: Option<&str>,
    ) -> Result<()> {
        let account = self.active_account_mut(iban)?;
        account.deposit(amount)?;
        let currency = account.currency;
        let description = match from_bank {
            Some(bank_name) => format!("Transfer from {from_iban} ({bank_name})"),
            None => format!("Transfer from {from_iban}"),
        };
        self.record(iban, TransactionKind::TransferIn, amount, currency, description);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::iban::SequentialIbanGenerator;

    fn bank() -> Bank {
        Bank::new("Banca Mea", "BMEARO22", BankLocation::B, BankCountry::RO)
    }

    fn bank_with_account(balance: i64, account_type: AccountType) -> (Bank, String) {
        let mut bank = bank();
        let mut iban_gen = SequentialIbanGenerator::new();
        let iban = bank
            .open_account(
                "Ana Pop",
                account_type,
                Currency::RON,
                Decimal::new(balance, 0),
                &mut iban_gen,
            )
            .unwrap();
        (bank, iban)
    }

    #[test]
    fn open_account_records_the_initial_deposit() {
        let (bank, iban) = bank_with_account(1000, AccountType::Person);

        let history = bank.transaction_history(&iban);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::AccountOpen);
        assert_eq!(history[0].amount, Decimal::new(1000, 0));

        let account = bank.find_account(&iban).unwrap();
        assert!(account.is_active());
        assert_eq!(account.balance, Decimal::new(1000, 0));
    }

    #[test]
    fn open_account_rejects_negative_initial_deposit() {
        let mut bank = bank();
        let mut iban_gen = SequentialIbanGenerator::new();
        let err = bank
            .open_account(
                "Ana Pop",
                AccountType::Person,
                Currency::RON,
                Decimal::new(-1, 0),
                &mut iban_gen,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
        assert!(bank.accounts().is_empty());
    }

    #[test]
    fn withdraw_charges_the_type_fee() {
        let (mut bank, iban) = bank_with_account(1000, AccountType::Person);

        // Person: 0.5% of 100 = 0.5
        let fee = bank.withdraw_money(&iban, Decimal::new(100, 0)).unwrap();
        assert_eq!(fee, Decimal::new(5, 1));
        assert_eq!(
            bank.find_account(&iban).unwrap().balance,
            Decimal::new(8995, 1)
        );
        assert_eq!(bank.fee_revenue, Decimal::new(5, 1));

        let history = bank.transaction_history(&iban);
        let last = history.last().unwrap();
        assert_eq!(last.kind, TransactionKind::Withdrawal);
        assert_eq!(last.amount, Decimal::new(-100, 0));
    }

    #[test]
    fn special_accounts_withdraw_without_fee() {
        let (mut bank, iban) = bank_with_account(1000, AccountType::Special);
        let fee = bank.withdraw_money(&iban, Decimal::new(100, 0)).unwrap();
        assert_eq!(fee, Decimal::ZERO);
        assert_eq!(
            bank.find_account(&iban).unwrap().balance,
            Decimal::new(900, 0)
        );
        assert_eq!(bank.fee_revenue, Decimal::ZERO);
    }

    #[test]
    fn withdraw_fails_when_fee_tips_over_the_balance() {
        let (mut bank, iban) = bank_with_account(100, AccountType::Company);
        // 100 + 1% fee = 101 > 100
        let err = bank.withdraw_money(&iban, Decimal::new(100, 0)).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds(_)));
        assert_eq!(
            bank.find_account(&iban).unwrap().balance,
            Decimal::new(100, 0)
        );
        assert_eq!(bank.fee_revenue, Decimal::ZERO);
        assert_eq!(bank.transaction_history(&iban).len(), 1);
    }

    #[test]
    fn deposit_converts_foreign_cash() {
        let (mut bank, iban) = bank_with_account(0, AccountType::Person);

        // 100 EUR into a RON account: 495 RON
        let credited = bank
            .deposit_money(&iban, Decimal::new(100, 0), Currency::EUR)
            .unwrap();
        assert_eq!(credited, Decimal::new(495, 0));

        let entry = bank.transaction_history(&iban).last().unwrap().clone();
        assert_eq!(entry.kind, TransactionKind::Deposit);
        assert_eq!(entry.amount, Decimal::new(495, 0));
        assert_eq!(entry.currency, Currency::RON);
        assert_eq!(entry.description, "Deposited 100 EUR");
    }

    #[test]
    fn close_requires_zero_balance_and_is_terminal() {
        let (mut bank, iban) = bank_with_account(10, AccountType::Person);

        let err = bank.close_account(&iban).unwrap_err();
        assert!(matches!(err, Error::NonZeroBalance { .. }));
        assert!(bank.find_account(&iban).unwrap().is_active());

        // Special-rate account in a fresh bank to empty without fees
        let (mut bank, iban) = bank_with_account(0, AccountType::Person);
        bank.close_account(&iban).unwrap();
        assert!(!bank.find_account(&iban).unwrap().is_active());
        assert_eq!(
            bank.transaction_history(&iban).last().unwrap().kind,
            TransactionKind::AccountClose
        );

        // Second close: the IBAN no longer resolves as active
        let err = bank.close_account(&iban).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn closed_accounts_refuse_money_operations() {
        let (mut bank, iban) = bank_with_account(0, AccountType::Person);
        bank.close_account(&iban).unwrap();

        assert!(matches!(
            bank.deposit_money(&iban, Decimal::new(10, 0), Currency::RON),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            bank.withdraw_money(&iban, Decimal::new(10, 0)),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            bank.change_account_currency(&iban, Currency::EUR),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn unknown_iban_has_empty_history() {
        let bank = bank();
        assert!(bank.transaction_history("RO00XXXX000000000000").is_empty());
    }

    #[test]
    fn location_change_is_informational() {
        let (mut bank, iban) = bank_with_account(500, AccountType::Person);
        bank.change_account_location(&iban, BankLocation::CJ).unwrap();

        let entry = bank.transaction_history(&iban).last().unwrap();
        assert_eq!(entry.kind, TransactionKind::LocationChange);
        assert_eq!(entry.amount, Decimal::ZERO);
        assert_eq!(entry.description, "Location changed to CJ");
        assert_eq!(
            bank.find_account(&iban).unwrap().balance,
            Decimal::new(500, 0)
        );
    }
}
