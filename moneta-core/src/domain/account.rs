//! Account domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::currency::{self, Currency};
use crate::domain::result::{Error, Result};

/// Year of the sentinel close date marking an account that was never closed.
const NEVER_CLOSED_YEAR: i32 = 2999;

/// Account type, which determines the withdrawal fee rate.
///
/// Closed set: adding a member requires extending
/// [`AccountType::withdrawal_fee_rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Person,
    Company,
    Special,
}

impl AccountType {
    /// Fee rate applied on top of every withdrawal.
    pub fn withdrawal_fee_rate(self) -> Decimal {
        match self {
            AccountType::Person => Decimal::new(5, 3),  // 0.5%
            AccountType::Company => Decimal::new(1, 2), // 1%
            AccountType::Special => Decimal::ZERO,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountType::Person => "Person",
            AccountType::Company => "Company",
            AccountType::Special => "Special",
        };
        f.write_str(name)
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "person" => Ok(AccountType::Person),
            "company" => Ok(AccountType::Company),
            "special" => Ok(AccountType::Special),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// A single customer account held at a bank
///
/// The balance is a fixed-point decimal in the account's own currency
/// and never goes negative: every operation validates before mutating,
/// so a failed call leaves the account exactly as it was.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub holder: String,
    pub account_type: AccountType,
    pub currency: Currency,
    /// Immutable once assigned by the bank.
    pub iban: String,
    pub opened_at: DateTime<Utc>,
    /// Sentinel far-future date (year 2999) while the account is open.
    pub closed_at: DateTime<Utc>,
    pub balance: Decimal,
}

impl Account {
    /// Fee rate for changing the account currency (2% of the balance).
    pub fn currency_change_fee_rate() -> Decimal {
        Decimal::new(2, 2)
    }

    /// The sentinel close date of an account that was never closed.
    pub fn never_closed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(NEVER_CLOSED_YEAR, 1, 1, 0, 0, 0).unwrap()
    }

    pub fn new(
        holder: impl Into<String>,
        account_type: AccountType,
        currency: Currency,
        iban: impl Into<String>,
        initial_balance: Decimal,
    ) -> Self {
        Self {
            holder: holder.into(),
            account_type,
            currency,
            iban: iban.into(),
            opened_at: Utc::now(),
            closed_at: Self::never_closed(),
            balance: initial_balance,
        }
    }

    /// True while the account has not been closed.
    pub fn is_active(&self) -> bool {
        self.closed_at.year() == NEVER_CLOSED_YEAR
    }

    /// Stamp the close date. Closing is terminal; the bank only calls
    /// this once the balance is zero.
    pub(crate) fn close(&mut self) {
        self.closed_at = Utc::now();
    }

    /// Credit the account. The amount must already be in the account's
    /// currency; callers convert first.
    pub fn deposit(&mut self, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        self.balance += amount;
        Ok(())
    }

    /// Debit the account, in the account's currency.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        if amount > self.balance {
            return Err(Error::insufficient_funds(format!(
                "cannot withdraw {} {} from a balance of {} {}",
                amount, self.currency, self.balance, self.currency
            )));
        }
        self.balance -= amount;
        Ok(())
    }

    /// Re-denominate the account into `new_currency`.
    ///
    /// The 2% fee is charged in the old currency and the remainder is
    /// then converted; this order is a fixed policy. Balance and
    /// currency change together or not at all. Returns the new balance.
    pub fn change_currency(&mut self, new_currency: Currency) -> Result<Decimal> {
        if new_currency == self.currency {
            return Err(Error::SameCurrency(self.currency));
        }

        let fee = self.balance * Self::currency_change_fee_rate();
        if self.balance < fee {
            return Err(Error::insufficient_funds(format!(
                "balance {} {} cannot cover the {} {} currency change fee",
                self.balance, self.currency, fee, self.currency
            )));
        }

        let converted = currency::convert(self.balance - fee, self.currency, new_currency);
        self.balance = converted;
        self.currency = new_currency;
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ron_account(balance: i64) -> Account {
        Account::new(
            "Ana Pop",
            AccountType::Person,
            Currency::RON,
            "RO49AAAA000000000001",
            Decimal::new(balance, 0),
        )
    }

    #[test]
    fn deposit_rejects_non_positive_amounts() {
        let mut acc = ron_account(100);
        assert!(matches!(
            acc.deposit(Decimal::ZERO),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            acc.deposit(Decimal::new(-5, 0)),
            Err(Error::InvalidAmount(_))
        ));
        assert_eq!(acc.balance, Decimal::new(100, 0));

        acc.deposit(Decimal::new(50, 0)).unwrap();
        assert_eq!(acc.balance, Decimal::new(150, 0));
    }

    #[test]
    fn withdraw_checks_amount_and_balance() {
        let mut acc = ron_account(100);
        assert!(matches!(
            acc.withdraw(Decimal::new(-1, 0)),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            acc.withdraw(Decimal::new(101, 0)),
            Err(Error::InsufficientFunds(_))
        ));
        // failed attempts never decrement
        assert_eq!(acc.balance, Decimal::new(100, 0));

        acc.withdraw(Decimal::new(100, 0)).unwrap();
        assert_eq!(acc.balance, Decimal::ZERO);
    }

    #[test]
    fn change_currency_charges_fee_then_converts() {
        let mut acc = ron_account(1000);
        let new_balance = acc.change_currency(Currency::EUR).unwrap();

        // fee = 20 RON, converted = 980 / 4.95
        assert_eq!(acc.currency, Currency::EUR);
        assert_eq!(new_balance.round_dp(2), Decimal::new(19798, 2));
        assert_eq!(acc.balance, new_balance);
    }

    #[test]
    fn change_currency_to_same_currency_fails() {
        let mut acc = ron_account(1000);
        assert!(matches!(
            acc.change_currency(Currency::RON),
            Err(Error::SameCurrency(Currency::RON))
        ));
        assert_eq!(acc.balance, Decimal::new(1000, 0));
        assert_eq!(acc.currency, Currency::RON);
    }

    #[test]
    fn zero_balance_converts_for_free() {
        let mut acc = ron_account(0);
        acc.change_currency(Currency::USD).unwrap();
        assert_eq!(acc.currency, Currency::USD);
        assert_eq!(acc.balance, Decimal::ZERO);
    }

    #[test]
    fn close_is_terminal() {
        let mut acc = ron_account(0);
        assert!(acc.is_active());
        acc.close();
        assert!(!acc.is_active());
    }

    #[test]
    fn withdrawal_fee_rates_by_type() {
        assert_eq!(
            AccountType::Person.withdrawal_fee_rate(),
            Decimal::new(5, 3)
        );
        assert_eq!(
            AccountType::Company.withdrawal_fee_rate(),
            Decimal::new(1, 2)
        );
        assert_eq!(AccountType::Special.withdrawal_fee_rate(), Decimal::ZERO);
    }
}
