//! Trait definitions for injectable dependencies

pub mod iban;

pub use iban::{IbanGenerator, RandomIbanGenerator, SequentialIbanGenerator};
