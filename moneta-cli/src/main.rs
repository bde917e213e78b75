//! Moneta CLI - multi-bank retail ledger in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use moneta_core::{BankLocation, Currency};

mod commands;
mod output;

use commands::{account, bank, history, logs, money, transfer};

/// Moneta - multi-bank retail ledger in your terminal
#[derive(Parser)]
#[command(name = "mta", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage banks
    Bank {
        #[command(subcommand)]
        command: bank::BankCommands,
    },

    /// Manage accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Deposit money into an account
    Deposit {
        /// Destination IBAN
        iban: String,
        /// Amount to deposit
        amount: Decimal,
        /// Currency of the incoming cash (defaults to the account currency)
        #[arg(long)]
        currency: Option<Currency>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw money from an account
    Withdraw {
        /// Source IBAN
        iban: String,
        /// Amount to withdraw, before the holder-type fee
        amount: Decimal,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transfer money between accounts, within or across banks
    Transfer {
        /// Source IBAN
        from_iban: String,
        /// Destination IBAN
        to_iban: String,
        /// Amount to transfer, in the source account currency
        amount: Decimal,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an account's transaction history
    History {
        /// Account IBAN
        iban: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-denominate an account into another currency (2% fee)
    Convert {
        /// Account IBAN
        iban: String,
        /// Target currency
        currency: Currency,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record an account location change
    Relocate {
        /// Account IBAN
        iban: String,
        /// New location code (TM, AR, B, CT, IS, CJ, TL, BR, BV, DB)
        location: BankLocation,
    },

    /// Show recent log entries
    Logs {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Bank { command } => bank::run(command),
        Commands::Account { command } => account::run(command),
        Commands::Deposit { iban, amount, currency, json } => {
            money::run_deposit(&iban, amount, currency, json)
        }
        Commands::Withdraw { iban, amount, json } => money::run_withdraw(&iban, amount, json),
        Commands::Transfer { from_iban, to_iban, amount, json } => {
            transfer::run(&from_iban, &to_iban, amount, json)
        }
        Commands::History { iban, json } => history::run(&iban, json),
        Commands::Convert { iban, currency, json } => money::run_convert(&iban, currency, json),
        Commands::Relocate { iban, location } => money::run_relocate(&iban, location),
        Commands::Logs { limit, json } => logs::run(limit, json),
    }
}
