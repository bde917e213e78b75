//! IBAN issuance port

use std::collections::HashSet;

use rand::Rng;

use crate::domain::bank::BankCountry;

/// Issues account identifiers of the form
/// `{country}{2-digit check}{4-char bank code}{12-digit number}`.
///
/// Implementations must never return the same IBAN twice over the
/// generator's lifetime. One generator instance serves the whole
/// registry, which is what makes IBANs unique across all banks.
pub trait IbanGenerator: Send {
    fn next_iban(&mut self, country: BankCountry, swift: &str) -> String;

    /// Teach the generator an IBAN that already exists (restored from a
    /// snapshot), so it is never issued again.
    fn mark_issued(&mut self, iban: &str) {
        let _ = iban;
    }
}

fn bank_code(swift: &str) -> String {
    swift.chars().take(4).collect::<String>().to_uppercase()
}

/// Random issuance with retry-on-collision against the set of every
/// IBAN handed out (or observed) so far.
#[derive(Debug, Default)]
pub struct RandomIbanGenerator {
    issued: HashSet<String>,
}

impl RandomIbanGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IbanGenerator for RandomIbanGenerator {
    fn next_iban(&mut self, country: BankCountry, swift: &str) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let check: u32 = rng.gen_range(10..100);
            let number: u64 = rng.gen_range(0..1_000_000_000_000);
            let iban = format!("{country}{check}{}{number:012}", bank_code(swift));
            if self.issued.insert(iban.clone()) {
                return iban;
            }
        }
    }

    fn mark_issued(&mut self, iban: &str) {
        self.issued.insert(iban.to_string());
    }
}

/// Counter-based issuance, unique by construction. Deterministic, for
/// tests and demo data.
#[derive(Debug)]
pub struct SequentialIbanGenerator {
    next: u64,
}

impl SequentialIbanGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for SequentialIbanGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IbanGenerator for SequentialIbanGenerator {
    fn next_iban(&mut self, country: BankCountry, swift: &str) -> String {
        let n = self.next;
        self.next += 1;
        format!("{country}00{}{n:012}", bank_code(swift))
    }
}
