//! Bank command - register and list banks

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;

use moneta_core::{BankCountry, BankLocation, LogEvent};

use super::{get_context, get_logger, log_event, save_context};
use crate::output;

/// One bank as rendered by `bank list --json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BankRow {
    name: String,
    swift: String,
    location: BankLocation,
    country: BankCountry,
    active_accounts: usize,
    fee_revenue: Decimal,
}

#[derive(Subcommand)]
pub enum BankCommands {
    /// Register a new bank
    New {
        /// Bank name (unique per country)
        name: String,
        /// SWIFT/BIC code
        swift: String,
        /// Branch location code (TM, AR, B, CT, IS, CJ, TL, BR, BV, DB)
        #[arg(long, default_value = "B")]
        location: BankLocation,
        /// Country code (RO, HU, DE, GB, FR, IT, ES, PL)
        #[arg(long, default_value = "RO")]
        country: BankCountry,
    },
    /// List registered banks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: BankCommands) -> Result<()> {
    match command {
        BankCommands::New { name, swift, location, country } => new(&name, &swift, location, country),
        BankCommands::List { json } => list(json),
    }
}

fn new(name: &str, swift: &str, location: BankLocation, country: BankCountry) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context()?;

    ctx.registry.create_bank(name, swift, location, country)?;
    save_context(&ctx)?;

    log_event(
        &logger,
        LogEvent::new("bank_created").with_command(format!("bank new {}", name)),
    );
    output::success(&format!("Bank '{}' registered in {}, {}", name, location, country));
    Ok(())
}

fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;

    if ctx.registry.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No banks registered. Use {} to add one.", "mta bank new".bold());
        }
        return Ok(());
    }

    if json {
        let mut rows = Vec::new();
        for bank in ctx.registry.banks() {
            let guard = bank.lock()?;
            rows.push(BankRow {
                name: guard.name.clone(),
                swift: guard.swift.clone(),
                location: guard.location,
                country: guard.country,
                active_accounts: guard.active_account_count(),
                fee_revenue: guard.fee_revenue,
            });
        }
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Name", "Country", "Location", "SWIFT", "Accounts", "Fee revenue"]);
    for bank in ctx.registry.banks() {
        let guard = bank.lock()?;
        table.add_row(vec![
            guard.name.clone(),
            guard.country.to_string(),
            guard.location.to_string(),
            guard.swift.clone(),
            guard.active_account_count().to_string(),
            guard.fee_revenue.round_dp(2).to_string(),
        ]);
    }
    println!("{}", table);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_row_serializes_with_camel_case_keys() {
        let row = BankRow {
            name: "Banca Mea".to_string(),
            swift: "BMEARO22".to_string(),
            location: BankLocation::B,
            country: BankCountry::RO,
            active_accounts: 2,
            fee_revenue: Decimal::new(15, 1),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["name"], "Banca Mea");
        assert_eq!(json["activeAccounts"], 2);
        assert_eq!(json["feeRevenue"].as_str(), Some("1.5"));
        assert_eq!(json["country"], "RO");
    }
}
