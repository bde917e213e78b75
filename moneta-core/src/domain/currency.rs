//! Currency enumeration and the fixed conversion table

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account currency.
///
/// Closed set: adding a member requires extending the rate table in
/// [`Currency::rate_to_base`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    RON,
    EUR,
    USD,
    GBP,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::RON, Currency::EUR, Currency::USD, Currency::GBP];

    /// Fixed rate to the base currency (RON).
    pub fn rate_to_base(self) -> Decimal {
        match self {
            Currency::RON => Decimal::ONE,
            Currency::EUR => Decimal::new(495, 2),
            Currency::USD => Decimal::new(450, 2),
            Currency::GBP => Decimal::new(580, 2),
        }
    }
}

/// Convert an amount between currencies via the fixed RON-base table.
///
/// Total over the closed [`Currency`] set; precision is whatever
/// `Decimal` carries (well beyond the 2 fractional digits shown to
/// users), so an A→B→A round trip is exact up to fixed-point rounding.
pub fn convert(amount: Decimal, from: Currency, to: Currency) -> Decimal {
    if from == to {
        return amount;
    }
    amount * from.rate_to_base() / to.rate_to_base()
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Currency::RON => "RON",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
        };
        f.write_str(code)
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RON" => Ok(Currency::RON),
            "EUR" => Ok(Currency::EUR),
            "USD" => Ok(Currency::USD),
            "GBP" => Ok(Currency::GBP),
            other => Err(format!("unknown currency: {other}")),
        }
    }
}
