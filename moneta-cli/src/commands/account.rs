//! Account command - open, close, and inspect accounts

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use rust_decimal::Decimal;

use moneta_core::{AccountType, BankCountry, Currency, LogEvent};

use super::{get_context, get_logger, log_event, require_account_bank, save_context};
use crate::output;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open an account at a registered bank
    Open {
        /// Account holder name
        holder: String,
        /// Bank name
        #[arg(long)]
        bank: String,
        /// Bank country
        #[arg(long, default_value = "RO")]
        country: BankCountry,
        /// Holder type (person, company, special)
        #[arg(long = "type", default_value = "person")]
        account_type: AccountType,
        /// Account currency
        #[arg(long, default_value = "RON")]
        currency: Currency,
        /// Initial deposit, in the account currency
        #[arg(long, default_value = "0")]
        deposit: Decimal,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Close an account (balance must be zero)
    Close {
        /// Account IBAN
        iban: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
    /// Show account details
    Show {
        /// Account IBAN
        iban: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AccountCommands) -> Result<()> {
    match command {
        AccountCommands::Open { holder, bank, country, account_type, currency, deposit, json } => {
            open(&holder, &bank, country, account_type, currency, deposit, json)
        }
        AccountCommands::Close { iban, force } => close(&iban, force),
        AccountCommands::Show { iban, json } => show(&iban, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn open(
    holder: &str,
    bank_name: &str,
    country: BankCountry,
    account_type: AccountType,
    currency: Currency,
    deposit: Decimal,
    json: bool,
) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context()?;

    let Some(bank) = ctx.registry.get(bank_name, country) else {
        bail!("Bank '{}' ({}) not found. Use 'mta bank list' to see registered banks.", bank_name, country);
    };

    let iban = ctx
        .registry
        .open_account(&bank, holder, account_type, currency, deposit)?;
    save_context(&ctx)?;

    log_event(
        &logger,
        LogEvent::new("account_opened").with_command(format!("account open {}", iban)),
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "iban": iban,
                "bank": bank_name,
                "holder": holder,
                "currency": currency,
                "balance": deposit,
            }))?
        );
        return Ok(());
    }

    output::success(&format!("Account opened for {} at {}", holder, bank_name));
    println!("IBAN: {}", iban.bold());
    Ok(())
}

fn close(iban: &str, force: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let bank = require_account_bank(&ctx, iban)?;

    if !force {
        println!("\n{}", format!("This will close account {}.", iban).yellow());
        println!("{}\n", "Closed accounts stay on file but refuse all operations.".dimmed());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    bank.lock()?.close_account(iban)?;
    save_context(&ctx)?;

    log_event(
        &logger,
        LogEvent::new("account_closed").with_command(format!("account close {}", iban)),
    );
    output::success(&format!("Account {} closed", iban));
    Ok(())
}

fn show(iban: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let bank = require_account_bank(&ctx, iban)?;

    let guard = bank.lock()?;
    // require_account_bank already proved the account exists
    let account = guard
        .find_account(iban)
        .ok_or_else(|| anyhow::anyhow!("No account with IBAN {}", iban))?;

    if json {
        let mut value = serde_json::to_value(account)?;
        value["bank"] = serde_json::json!(bank.name());
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let status = if account.is_active() {
        "active".to_string()
    } else {
        format!("closed {}", account.closed_at.format("%Y-%m-%d"))
    };

    let mut table = output::create_table();
    table.add_row(vec!["IBAN", &account.iban]);
    table.add_row(vec!["Holder", &account.holder]);
    table.add_row(vec!["Type", &account.account_type.to_string()]);
    table.add_row(vec!["Bank", bank.name()]);
    table.add_row(vec![
        "Balance",
        &output::format_money(account.balance, account.currency),
    ]);
    table.add_row(vec!["Opened", &account.opened_at.format("%Y-%m-%d").to_string()]);
    table.add_row(vec!["Status", &status]);
    println!("{}", table);

    Ok(())
}
