//! History command - show an account's ledger

use anyhow::Result;

use super::{get_context, require_account_bank};
use crate::output;

pub fn run(iban: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let bank = require_account_bank(&ctx, iban)?;

    let guard = bank.lock()?;
    let entries = guard.transaction_history(iban);

    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No transactions recorded for {}.", iban);
        println!("Ledgers reset between sessions unless persistLedgers is enabled in settings.json.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Kind", "Amount", "Currency", "Description"]);
    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.kind.to_string(),
            entry.amount.round_dp(2).to_string(),
            entry.currency.to_string(),
            entry.description.clone(),
        ]);
    }
    println!("{}", table);

    Ok(())
}
