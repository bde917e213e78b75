//! Result and error types for the core library

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::bank::BankCountry;
use crate::domain::currency::Currency;

/// Core library error type
///
/// Every engine operation fails fast: when an `Error` comes back, no
/// state was mutated.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Account holds {balance} {currency}, withdraw before closing")]
    NonZeroBalance { balance: Decimal, currency: Currency },

    #[error("A bank named {name} already exists in {country}")]
    DuplicateBank { name: String, country: BankCountry },

    #[error("Account is already denominated in {0}")]
    SameCurrency(Currency),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an insufficient funds error
    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        Self::InsufficientFunds(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a generic internal error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
