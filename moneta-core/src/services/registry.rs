//! Bank registry - owns every bank and the shared IBAN issuer

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::domain::account::AccountType;
use crate::domain::bank::{Bank, BankCountry, BankLocation};
use crate::domain::currency::Currency;
use crate::domain::result::{Error, Result};
use crate::ports::iban::IbanGenerator;
use rust_decimal::Decimal;

/// A bank behind its own mutual-exclusion lock.
///
/// Every engine operation on a bank runs under this lock. The transfer
/// coordinator is the only caller that ever needs two banks at once and
/// it always locks them in `id` order, so lock acquisition cannot
/// deadlock.
#[derive(Debug)]
pub struct SharedBank {
    id: Uuid,
    name: String,
    country: BankCountry,
    inner: Mutex<Bank>,
}

/// Shared handle to a registered bank.
pub type BankRef = Arc<SharedBank>;

impl SharedBank {
    pub fn new(bank: Bank) -> BankRef {
        Arc::new(Self {
            id: bank.id,
            name: bank.name.clone(),
            country: bank.country,
            inner: Mutex::new(bank),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn country(&self) -> BankCountry {
        self.country
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Bank>> {
        self.inner
            .lock()
            .map_err(|_| Error::other("bank lock poisoned"))
    }
}

/// The collection of banks, keyed by the unique `(name, country)` pair
/// and listed in creation order. Also owns the IBAN issuer shared by
/// all banks, which keeps IBANs globally unique.
pub struct BankRegistry {
    banks: Vec<BankRef>,
    iban_gen: Box<dyn IbanGenerator>,
}

impl BankRegistry {
    pub fn new(iban_gen: Box<dyn IbanGenerator>) -> Self {
        Self {
            banks: Vec::new(),
            iban_gen,
        }
    }

    /// Build a registry from banks restored out of a snapshot. Every
    /// existing IBAN is taught to the issuer first so new accounts can
    /// never collide with persisted ones.
    pub fn with_banks(banks: Vec<Bank>, mut iban_gen: Box<dyn IbanGenerator>) -> Self {
        for bank in &banks {
            for account in bank.accounts() {
                iban_gen.mark_issued(&account.iban);
            }
        }
        Self {
            banks: banks.into_iter().map(SharedBank::new).collect(),
            iban_gen,
        }
    }

    /// Register a new bank. The `(name, country)` pair must be unique.
    pub fn create_bank(
        &mut self,
        name: impl Into<String>,
        swift: impl Into<String>,
        location: BankLocation,
        country: BankCountry,
    ) -> Result<BankRef> {
        let name = name.into();
        if self.get(&name, country).is_some() {
            return Err(Error::DuplicateBank { name, country });
        }

        let bank = SharedBank::new(Bank::new(name, swift, location, country));
        self.banks.push(Arc::clone(&bank));
        Ok(bank)
    }

    /// All banks, in creation order.
    pub fn banks(&self) -> &[BankRef] {
        &self.banks
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    /// Look up a bank by its unique `(name, country)` key.
    pub fn get(&self, name: &str, country: BankCountry) -> Option<BankRef> {
        self.banks
            .iter()
            .find(|b| b.name() == name && b.country() == country)
            .map(Arc::clone)
    }

    /// Locate the bank holding an IBAN, active or closed.
    pub fn find_account_bank(&self, iban: &str) -> Result<Option<BankRef>> {
        for bank in &self.banks {
            if bank.lock()?.find_account(iban).is_some() {
                return Ok(Some(Arc::clone(bank)));
            }
        }
        Ok(None)
    }

    /// Open an account at `bank`, issuing the IBAN through the shared
    /// generator. Returns the new IBAN.
    pub fn open_account(
        &mut self,
        bank: &BankRef,
        holder: impl Into<String>,
        account_type: AccountType,
        currency: Currency,
        initial_deposit: Decimal,
    ) -> Result<String> {
        bank.lock()?.open_account(
            holder,
            account_type,
            currency,
            initial_deposit,
            self.iban_gen.as_mut(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::iban::{RandomIbanGenerator, SequentialIbanGenerator};
    use std::collections::HashSet;

    fn registry() -> BankRegistry {
        BankRegistry::new(Box::new(SequentialIbanGenerator::new()))
    }

    #[test]
    fn bank_names_are_unique_per_country() {
        let mut registry = registry();
        registry
            .create_bank("Banca Mea", "BMEARO22", BankLocation::B, BankCountry::RO)
            .unwrap();

        let err = registry
            .create_bank("Banca Mea", "BMEARO33", BankLocation::CJ, BankCountry::RO)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateBank { .. }));

        // Same name in another country is a different bank
        registry
            .create_bank("Banca Mea", "BMEADE22", BankLocation::B, BankCountry::DE)
            .unwrap();
        assert_eq!(registry.banks().len(), 2);
    }

    #[test]
    fn ibans_are_unique_across_banks() {
        let mut registry = BankRegistry::new(Box::new(RandomIbanGenerator::new()));
        let first = registry
            .create_bank("First", "FRSTRO22", BankLocation::B, BankCountry::RO)
            .unwrap();
        let second = registry
            .create_bank("Second", "SCNDRO22", BankLocation::CJ, BankCountry::RO)
            .unwrap();

        let mut seen = HashSet::new();
        for _ in 0..100 {
            for bank in [&first, &second] {
                let iban = registry
                    .open_account(
                        bank,
                        "Ana Pop",
                        AccountType::Person,
                        Currency::RON,
                        Decimal::ZERO,
                    )
                    .unwrap();
                assert!(seen.insert(iban));
            }
        }
    }

    #[test]
    fn find_account_bank_scans_the_registry() {
        let mut registry = registry();
        let first = registry
            .create_bank("First", "FRSTRO22", BankLocation::B, BankCountry::RO)
            .unwrap();
        let second = registry
            .create_bank("Second", "SCNDRO22", BankLocation::CJ, BankCountry::RO)
            .unwrap();

        let iban = registry
            .open_account(
                &second,
                "Ana Pop",
                AccountType::Person,
                Currency::RON,
                Decimal::ZERO,
            )
            .unwrap();

        let found = registry.find_account_bank(&iban).unwrap().unwrap();
        assert_eq!(found.id(), second.id());
        assert_ne!(found.id(), first.id());
        assert!(registry
            .find_account_bank("RO00NONE000000000000")
            .unwrap()
            .is_none());
    }
}
