use std::{env, process};

use chrono::NaiveDate;
use uuid::Uuid;

use rollbook::{
    core::RollupEngine,
    init,
    ledger::{Account, DateRange, Flows, Transaction},
    storage::{JsonStore, LedgerStore},
};

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_else(|| {
        print_usage();
        process::exit(1);
    });

    let store = JsonStore::new_default()?;

    match command.as_str() {
        "account" => {
            let name = args.next().unwrap_or_else(|| {
                print_usage();
                process::exit(1);
            });
            let opening = args
                .next()
                .map(|raw| raw.parse::<f64>())
                .transpose()?
                .unwrap_or(0.0);
            let account = Account::new(name, opening);
            store.create_account(account.clone())?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        "txn" => {
            let account_id: Uuid = required(&mut args)?.parse()?;
            let date: NaiveDate = required(&mut args)?.parse()?;
            let description = required(&mut args)?;
            let mut flows = Flows::default();
            for pair in args {
                let (field, amount) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("expected <field>=<amount>, got `{pair}`"))?;
                let amount: f64 = amount.parse()?;
                match field {
                    "deposit" => flows.deposit = amount,
                    "other_deposit" => flows.other_deposit = amount,
                    "up_line_deposit" => flows.up_line_deposit = amount,
                    "penal_withdrawal" => flows.penal_withdrawal = amount,
                    "other_withdrawal" => flows.other_withdrawal = amount,
                    "up_line_withdrawal" => flows.up_line_withdrawal = amount,
                    other => return Err(format!("unknown flow field `{other}`").into()),
                }
            }
            let txn = Transaction::new(account_id, date, description, flows);
            store.create_transaction(txn.clone())?;
            println!("{}", serde_json::to_string_pretty(&txn)?);
        }
        "preview" => {
            let range = parse_range(&mut args)?;
            let engine = RollupEngine::new(Box::new(store));
            let preview = engine.preview(range)?;
            println!("{}", serde_json::to_string_pretty(&PreviewOut::from(preview))?);
        }
        "commit" => {
            let range = parse_range(&mut args)?;
            let engine = RollupEngine::new(Box::new(store));
            let outcome = engine.commit(range)?;
            println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
            if !outcome.report.is_clean() {
                eprintln!(
                    "Warning: partial failure: {} transaction(s), {} account(s) skipped",
                    outcome.report.archive_failures, outcome.report.account_failures
                );
            }
        }
        "undo" => {
            let summary_id: Uuid = required(&mut args)?.parse()?;
            let engine = RollupEngine::new(Box::new(store));
            let report = engine.undo(summary_id)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "summaries" => {
            let summaries = store.list_summaries()?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        "checkpoints" => {
            let checkpoints = store.list_checkpoints()?;
            println!("{}", serde_json::to_string_pretty(&checkpoints)?);
        }
        _ => {
            print_usage();
            process::exit(1);
        }
    }

    Ok(())
}

fn required(args: &mut impl Iterator<Item = String>) -> Result<String, Box<dyn std::error::Error>> {
    args.next().ok_or_else(|| {
        print_usage();
        process::exit(1);
    })
}

fn parse_range(
    args: &mut impl Iterator<Item = String>,
) -> Result<DateRange, Box<dyn std::error::Error>> {
    let start: NaiveDate = required(args)?.parse()?;
    let end = match args.next() {
        Some(raw) => raw.parse()?,
        None => start,
    };
    Ok(DateRange::new(start, end)?)
}

#[derive(serde::Serialize)]
struct PreviewOut {
    range: String,
    per_account: Vec<rollbook::ledger::AccountRollup>,
    overall: rollbook::ledger::OverallRollup,
    txn_count: usize,
}

impl From<rollbook::core::RangePreview> for PreviewOut {
    fn from(preview: rollbook::core::RangePreview) -> Self {
        Self {
            range: preview.range.label(),
            per_account: preview.per_account,
            overall: preview.overall,
            txn_count: preview.txn_count,
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage: rollbook_cli <command>\n\
         \n\
         Commands:\n\
           account <name> [opening]                     create an account\n\
           txn <account-id> <date> <desc> [f=amt ...]   record a transaction\n\
           preview <start> [end]                        non-destructive roll-up view\n\
           commit <start> [end]                         roll the range into a summary\n\
           undo <summary-id>                            reverse a committed summary\n\
           summaries                                    list committed summaries\n\
           checkpoints                                  list in-flight commit markers\n\
         \n\
         Flow fields: deposit, other_deposit, up_line_deposit,\n\
           penal_withdrawal, other_withdrawal, up_line_withdrawal\n\
         Data directory: $ROLLBOOK_HOME (default ~/.rollbook)"
    );
}
