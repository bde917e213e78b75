//! Transfer command - move money between accounts

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::ProgressBar;
use rust_decimal::Decimal;

use moneta_core::LogEvent;

use super::{get_context, get_logger, log_event, require_account_bank, save_context};
use crate::output;

pub fn run(from_iban: &str, to_iban: &str, amount: Decimal, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;

    let source = require_account_bank(&ctx, from_iban)?;
    // The coordinator validates the destination; a missing IBAN fails
    // before any money moves.
    let destination = ctx.registry.find_account_bank(to_iban)?;

    let spinner = if json {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!("Processing transfer of {} to {}...", amount, to_iban));
        Some(pb)
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(ctx.transfers.transfer(
        &source,
        destination.as_ref(),
        from_iban,
        to_iban,
        amount,
    ));

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let receipt = match result {
        Ok(receipt) => receipt,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("transfer_failed")
                    .with_command(format!("transfer {} {}", from_iban, to_iban))
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };
    save_context(&ctx)?;

    log_event(
        &logger,
        LogEvent::new("transfer").with_command(format!("transfer {} {}", from_iban, to_iban)),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
        return Ok(());
    }

    output::success(&format!(
        "Transferred {} from {} to {}",
        output::format_money(receipt.amount, receipt.source_currency),
        from_iban,
        to_iban
    ));

    let mut table = output::create_table();
    table.add_row(vec![
        "Fee",
        &output::format_money(receipt.fee, receipt.source_currency),
    ]);
    table.add_row(vec![
        "Credited",
        &output::format_money(receipt.credited, receipt.destination_currency),
    ]);
    table.add_row(vec![
        "Route",
        if receipt.same_bank { "same bank (1% fee)" } else { "cross-bank (3% fee)" },
    ]);
    table.add_row(vec!["Processing time", &format!("{} ms", receipt.delay_ms)]);
    println!("{}", table);

    if !receipt.same_bank {
        println!("{}", "Cross-bank transfers settle with a longer delay.".dimmed());
    }

    Ok(())
}
