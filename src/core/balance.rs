//! Pure balance arithmetic over transaction slices. No I/O.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::ledger::{Account, Flows, Transaction};

/// One transaction annotated with the balance after applying it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningBalance {
    pub txn_id: Uuid,
    pub date: NaiveDate,
    pub net: f64,
    pub balance: f64,
}

/// Aggregate of every flow column for one account over a transaction slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountTotals {
    pub totals: Flows,
    pub txn_count: usize,
    pub credits: f64,
    pub debits: f64,
    pub final_balance: f64,
}

/// Annotates `txns` (already sorted ascending by date) with running balances
/// seeded from `opening`. The input is left untouched.
pub fn running_balances(opening: f64, txns: &[Transaction]) -> Vec<RunningBalance> {
    let mut balance = opening;
    txns.iter()
        .map(|txn| {
            let net = txn.net();
            balance += net;
            RunningBalance {
                txn_id: txn.id,
                date: txn.date,
                net,
                balance,
            }
        })
        .collect()
}

/// Sums the six flow columns across the transactions belonging to `account`
/// and reports the resulting closing balance.
pub fn totals_for(account: &Account, txns: &[Transaction]) -> AccountTotals {
    let mut totals = Flows::default();
    let mut txn_count = 0;
    for txn in txns.iter().filter(|txn| txn.account_id == account.id) {
        totals.accumulate(&txn.flows);
        txn_count += 1;
    }
    let credits = totals.credits();
    let debits = totals.debits();
    AccountTotals {
        totals,
        txn_count,
        credits,
        debits,
        final_balance: account.opening_balance + credits - debits,
    }
}
