//! Money commands - deposit, withdraw, convert, relocate

use anyhow::Result;
use rust_decimal::Decimal;

use moneta_core::{BankLocation, Currency, LogEvent};

use super::{get_context, get_logger, log_event, require_account_bank, save_context};
use crate::output;

pub fn run_deposit(
    iban: &str,
    amount: Decimal,
    currency: Option<Currency>,
    json: bool,
) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let bank = require_account_bank(&ctx, iban)?;

    let (credited, account_currency) = {
        let mut guard = bank.lock()?;
        let account_currency = guard
            .find_account(iban)
            .map(|a| a.currency)
            .ok_or_else(|| anyhow::anyhow!("No account with IBAN {}", iban))?;
        let currency = currency.unwrap_or(account_currency);
        let credited = guard.deposit_money(iban, amount, currency)?;
        (credited, account_currency)
    };
    save_context(&ctx)?;

    log_event(
        &logger,
        LogEvent::new("deposit").with_command(format!("deposit {}", iban)),
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "iban": iban,
                "credited": credited,
                "currency": account_currency,
            }))?
        );
        return Ok(());
    }

    output::success(&format!(
        "Deposited {} into {}",
        output::format_money(credited, account_currency),
        iban
    ));
    Ok(())
}

pub fn run_withdraw(iban: &str, amount: Decimal, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let bank = require_account_bank(&ctx, iban)?;

    let (fee, balance, currency) = {
        let mut guard = bank.lock()?;
        let fee = guard.withdraw_money(iban, amount)?;
        let account = guard
            .find_account(iban)
            .ok_or_else(|| anyhow::anyhow!("No account with IBAN {}", iban))?;
        (fee, account.balance, account.currency)
    };
    save_context(&ctx)?;

    log_event(
        &logger,
        LogEvent::new("withdrawal").with_command(format!("withdraw {}", iban)),
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "iban": iban,
                "amount": amount,
                "fee": fee,
                "balance": balance,
                "currency": currency,
            }))?
        );
        return Ok(());
    }

    output::success(&format!(
        "Withdrew {} from {} (fee {})",
        output::format_money(amount, currency),
        iban,
        output::format_money(fee, currency)
    ));
    println!("New balance: {}", output::format_money(balance, currency));
    Ok(())
}

pub fn run_convert(iban: &str, currency: Currency, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let bank = require_account_bank(&ctx, iban)?;

    let new_balance = bank.lock()?.change_account_currency(iban, currency)?;
    save_context(&ctx)?;

    log_event(
        &logger,
        LogEvent::new("currency_changed").with_command(format!("convert {} {}", iban, currency)),
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "iban": iban,
                "currency": currency,
                "balance": new_balance,
            }))?
        );
        return Ok(());
    }

    output::success(&format!(
        "Account {} is now denominated in {}",
        iban, currency
    ));
    println!("New balance: {}", output::format_money(new_balance, currency));
    Ok(())
}

pub fn run_relocate(iban: &str, location: BankLocation) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let bank = require_account_bank(&ctx, iban)?;

    bank.lock()?.change_account_location(iban, location)?;
    save_context(&ctx)?;

    log_event(
        &logger,
        LogEvent::new("location_changed").with_command(format!("relocate {} {}", iban, location)),
    );
    output::success(&format!("Location for {} recorded as {}", iban, location));
    Ok(())
}
