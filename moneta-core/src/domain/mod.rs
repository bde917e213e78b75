//! Core domain entities
//!
//! Pure data structures and state machines with validation logic - no
//! I/O and no async. Everything monetary is a `rust_decimal::Decimal`.

pub mod account;
pub mod bank;
pub mod currency;
pub mod ledger;
pub mod result;

pub use account::{Account, AccountType};
pub use bank::{Bank, BankCountry, BankLocation};
pub use currency::Currency;
pub use ledger::{Ledger, Transaction, TransactionKind};
