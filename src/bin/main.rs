// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use account_ledger::{Account, Ledger, Statistics, Transaction, TransactionError};
use clap::{Parser, ValueEnum};
use csv::Writer;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Account Ledger demo
///
/// Opens a handful of accounts, replays a scripted sequence of deposits,
/// withdrawals and transfers, and reports every account's history together
/// with system-wide statistics.
#[derive(Parser, Debug)]
#[command(name = "account-ledger")]
#[command(about = "Runs a scripted ledger scenario and prints account summaries", long_about = None)]
struct Args {
    /// Output format for the final report
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log every applied and rejected operation to stderr
    ///
    /// Overridden by RUST_LOG when set.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Error)]
enum DemoError {
    #[error("ledger error: {0}")]
    Ledger(#[from] TransactionError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Progress narration only makes sense for the human-readable report.
    let ledger = if args.format == Format::Text {
        run_scenario(&mut out)
    } else {
        run_scenario(&mut io::sink())
    };
    let ledger = match ledger {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("Error running scenario: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_report(&ledger, args.format, &mut out) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Replays the demo scenario against a fresh ledger.
///
/// Section headings and the two expected rejections are narrated to `out`.
/// Any other rejection aborts the scenario.
fn run_scenario<W: Write>(out: &mut W) -> Result<Ledger, DemoError> {
    let ledger = Ledger::new();

    writeln!(out, "=== Banking Transaction System Demo ===\n")?;
    for (id, balance) in [
        ("ACC001", dec!(2500.00)),
        ("ACC002", dec!(1200.00)),
        ("ACC003", dec!(800.00)),
        ("MERCH001", dec!(5000.00)),
    ] {
        ledger.open_account(id, balance)?;
    }

    writeln!(out, "Initial account balances:")?;
    for account in ledger.accounts() {
        writeln!(out, "  {}: ${}", account.id(), account.balance())?;
    }

    writeln!(out, "\n--- Deposits ---")?;
    ledger.deposit("ACC001", dec!(500.00), "Monthly salary")?;
    ledger.deposit("ACC002", dec!(300.00), "Freelance payment")?;
    ledger.deposit("ACC003", dec!(150.00), "Birthday gift")?;

    writeln!(out, "\n--- Withdrawals ---")?;
    ledger.withdraw("ACC001", dec!(200.00), "ATM cash withdrawal")?;
    ledger.withdraw("ACC002", dec!(50.00), "Coffee shop")?;

    writeln!(out, "\n--- Transfers ---")?;
    ledger.transfer("ACC001", "ACC002", dec!(250.00), "Rent split payment")?;
    ledger.transfer("ACC002", "ACC003", dec!(75.00), "Dinner payment")?;
    ledger.transfer("ACC003", "ACC001", dec!(25.00), "Book loan repayment")?;

    writeln!(out, "\n--- Merchant Payments ---")?;
    ledger.transfer("ACC001", "MERCH001", dec!(120.00), "Online shopping")?;
    ledger.transfer("ACC002", "MERCH001", dec!(85.00), "Grocery purchase")?;
    ledger.transfer("ACC003", "MERCH001", dec!(45.00), "Gas station")?;

    writeln!(out, "\n--- Multiple Small Transactions ---")?;
    for i in 1..=3 {
        ledger.deposit("ACC001", dec!(10.00), &format!("Cashback reward #{i}"))?;
        ledger.withdraw("ACC002", dec!(5.00), &format!("Vending machine #{i}"))?;
    }

    writeln!(out, "\n--- Edge Cases ---")?;
    expect_rejection(
        out,
        ledger.withdraw("ACC001", dec!(10000.00), "Large withdrawal attempt"),
    )?;
    expect_rejection(
        out,
        ledger.deposit("ACC002", dec!(-50.00), "Negative deposit attempt"),
    )?;

    Ok(ledger)
}

fn expect_rejection<W: Write>(
    out: &mut W,
    result: Result<Arc<Transaction>, TransactionError>,
) -> Result<(), DemoError> {
    match result {
        Ok(tx) => {
            tracing::warn!(tx = %tx.id(), "operation expected to fail was applied");
            writeln!(out, "Unexpectedly applied: {}", tx.id())?;
        }
        Err(e) => writeln!(out, "Expected error: {}", e)?,
    }
    Ok(())
}

/// Writes the final report in the requested format.
fn write_report<W: Write>(ledger: &Ledger, format: Format, out: &mut W) -> Result<(), DemoError> {
    let accounts = ledger.accounts();
    let statistics = ledger.statistics();
    match format {
        Format::Text => write_text(&accounts, &statistics, out)?,
        Format::Json => write_json(&accounts, &statistics, out)?,
        Format::Csv => write_csv(&accounts, out)?,
    }
    Ok(())
}

fn write_text<W: Write>(
    accounts: &[Arc<Account>],
    statistics: &Statistics,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(60))?;
    writeln!(out, "FINAL ACCOUNT SUMMARIES")?;
    writeln!(out, "{}", "=".repeat(60))?;

    for account in accounts {
        let snapshot = account.snapshot();
        writeln!(out, "\n--- Account {} Summary ---", snapshot.id)?;
        writeln!(out, "Balance: ${}", snapshot.balance)?;
        writeln!(out, "Total Transactions: {}", snapshot.transactions.len())?;
        for tx in &snapshot.transactions {
            writeln!(
                out,
                "  {} | {} | {} | ${} | {} | {}",
                tx.id(),
                tx.timestamp().format("%Y-%m-%d %H:%M:%S"),
                tx.kind(),
                tx.amount(),
                tx.status(),
                tx.description()
            )?;
        }
    }

    writeln!(out, "\n--- System Statistics ---")?;
    writeln!(out, "{}", statistics)?;
    out.flush()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    accounts: &'a [Arc<Account>],
    statistics: &'a Statistics,
}

fn write_json<W: Write>(
    accounts: &[Arc<Account>],
    statistics: &Statistics,
    out: &mut W,
) -> Result<(), DemoError> {
    serde_json::to_writer_pretty(&mut *out, &JsonReport { accounts, statistics })?;
    writeln!(out)?;
    Ok(())
}

/// One history entry flattened for CSV output.
#[derive(Serialize)]
struct HistoryRow<'a> {
    account: &'a str,
    id: String,
    timestamp: String,
    #[serde(rename = "type")]
    kind: &'static str,
    amount: rust_decimal::Decimal,
    status: String,
    description: &'a str,
    counterparty: Option<&'a str>,
}

/// Writes every account's history, one row per record.
///
/// # CSV Format
///
/// Columns: `account, id, timestamp, type, amount, status, description, counterparty`
fn write_csv<W: Write>(accounts: &[Arc<Account>], out: &mut W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(out);

    for account in accounts {
        let snapshot = account.snapshot();
        for tx in &snapshot.transactions {
            wtr.serialize(HistoryRow {
                account: snapshot.id.as_str(),
                id: tx.id().to_string(),
                timestamp: tx.timestamp().to_rfc3339(),
                kind: tx.kind().name(),
                amount: tx.amount(),
                status: tx.status().to_string(),
                description: tx.description(),
                counterparty: tx.counterparty().map(|id| id.as_str()),
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_ledger::TransactionKind;
    use rust_decimal::Decimal;

    fn scenario() -> Ledger {
        run_scenario(&mut io::sink()).unwrap()
    }

    fn balance(ledger: &Ledger, id: &str) -> Decimal {
        ledger.get_account(id).unwrap().balance()
    }

    #[test]
    fn scenario_final_balances() {
        let ledger = scenario();
        assert_eq!(balance(&ledger, "ACC001"), dec!(2485.00));
        assert_eq!(balance(&ledger, "ACC002"), dec!(1525.00));
        assert_eq!(balance(&ledger, "ACC003"), dec!(955.00));
        assert_eq!(balance(&ledger, "MERCH001"), dec!(5250.00));
    }

    #[test]
    fn scenario_history_lengths() {
        let ledger = scenario();
        let counts: Vec<usize> = ledger
            .accounts()
            .iter()
            .map(|account| account.transaction_count())
            .collect();
        assert_eq!(counts, [8, 8, 4, 3]);
        assert!(ledger.accounts().iter().all(|a| a.verify_balance()));
    }

    #[test]
    fn scenario_statistics() {
        let stats = scenario().statistics();
        assert_eq!(stats.transaction_count, 23);
        assert_eq!(stats.total_volume, dec!(2445.00));
        assert_eq!(stats.average_size, Some(dec!(106.30)));
    }

    #[test]
    fn scenario_narrates_expected_errors() {
        let mut out = Vec::new();
        run_scenario(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Expected error: insufficient funds"));
        assert!(text.contains("Expected error: invalid amount (must be positive)"));
    }

    #[test]
    fn merchant_history_is_incoming_transfers() {
        let ledger = scenario();
        let merchant = ledger.get_account("MERCH001").unwrap();
        let senders: Vec<String> = merchant
            .transactions()
            .iter()
            .map(|tx| {
                assert!(matches!(tx.kind(), TransactionKind::Transfer { .. }));
                tx.counterparty().unwrap().to_string()
            })
            .collect();
        assert_eq!(senders, ["ACC001", "ACC002", "ACC003"]);
        assert_eq!(
            merchant.transactions()[0].description(),
            "Transfer from ACC001: Online shopping"
        );
    }

    #[test]
    fn text_report_layout() {
        let ledger = scenario();
        let mut out = Vec::new();
        write_report(&ledger, Format::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("--- Account ACC001 Summary ---"));
        assert!(text.contains("Balance: $2485.00"));
        assert!(text.contains("| DEPOSIT | $500.00 | COMPLETED | Monthly salary"));
        assert!(text.contains("| TRANSFER | $250.00 | COMPLETED | Transfer to ACC002: Rent split payment"));
        assert!(text.contains("Total Transactions Processed: 23"));
        assert!(text.contains("Average Transaction Size: $106.30"));
    }

    #[test]
    fn json_report_parses() {
        let ledger = scenario();
        let mut out = Vec::new();
        write_report(&ledger, Format::Json, &mut out).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let accounts = parsed["accounts"].as_array().unwrap();
        assert_eq!(accounts.len(), 4);
        assert_eq!(accounts[3]["id"], "MERCH001");
        assert_eq!(accounts[3]["balance"], "5250.00");
        assert_eq!(parsed["statistics"]["transaction_count"], 23);
    }

    #[test]
    fn csv_report_has_one_row_per_record() {
        let ledger = scenario();
        let mut out = Vec::new();
        write_report(&ledger, Format::Csv, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("account,id,timestamp,type,amount,status,description,counterparty")
        );
        assert_eq!(lines.count(), 23);
        assert!(text.contains(",WITHDRAWAL,200.00,COMPLETED,ATM cash withdrawal,"));
    }
}
