//! Read-only projection of what committing a date range would produce.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    ledger::{AccountRollup, DateRange, Flows, OverallRollup, Transaction},
    storage::{LedgerStore, TransactionFilter},
};

use super::Result;

/// Full aggregation of a range: the per-account and overall roll-ups plus
/// the raw matched transactions and the account versions they were computed
/// against. The commit phase consumes the latter two; preview exposes only
/// the projection.
#[derive(Debug, Clone)]
pub struct RangeAggregate {
    pub range: DateRange,
    pub per_account: Vec<AccountRollup>,
    pub overall: OverallRollup,
    pub txn_count: usize,
    pub transactions: Vec<Transaction>,
    /// Account version snapshot taken when the aggregate was computed; the
    /// commit balance phase writes against these tokens.
    pub account_versions: HashMap<Uuid, u64>,
}

/// Side-effect-free view returned to preview callers.
#[derive(Debug, Clone, PartialEq)]
pub struct RangePreview {
    pub range: DateRange,
    pub per_account: Vec<AccountRollup>,
    pub overall: OverallRollup,
    pub txn_count: usize,
}

impl From<RangeAggregate> for RangePreview {
    fn from(aggregate: RangeAggregate) -> Self {
        Self {
            range: aggregate.range,
            per_account: aggregate.per_account,
            overall: aggregate.overall,
            txn_count: aggregate.txn_count,
        }
    }
}

/// Computes the roll-up for `range` without mutating anything.
///
/// Every account appears in the result, including those with no matching
/// transactions (zero flows, `opening_after == opening_before`). Accounts
/// are ordered by name then id so repeated calls over unchanged data return
/// identical output.
pub fn aggregate_range(store: &dyn LedgerStore, range: DateRange) -> Result<RangeAggregate> {
    let mut accounts = store.list_accounts()?;
    accounts.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    let filter = TransactionFilter {
        range: Some(range),
        ..TransactionFilter::default()
    };
    let transactions = store.list_transactions(&filter)?;

    let mut by_account: HashMap<Uuid, Vec<&Transaction>> = HashMap::new();
    for txn in &transactions {
        by_account.entry(txn.account_id).or_default().push(txn);
    }

    let mut per_account = Vec::with_capacity(accounts.len());
    let mut account_versions = HashMap::with_capacity(accounts.len());
    for account in &accounts {
        let matched = by_account.get(&account.id).map(Vec::as_slice).unwrap_or(&[]);
        let mut totals = Flows::default();
        for txn in matched {
            totals.accumulate(&txn.flows);
        }
        let net = totals.net();
        account_versions.insert(account.id, account.version);
        per_account.push(AccountRollup {
            account_id: account.id,
            account_name: account.name.clone(),
            opening_before: account.opening_balance,
            txn_count: matched.len(),
            totals,
            net,
            opening_after: account.opening_balance + net,
        });
    }

    let overall = OverallRollup::fold(&per_account);
    let txn_count = transactions.len();
    Ok(RangeAggregate {
        range,
        per_account,
        overall,
        txn_count,
        transactions,
        account_versions,
    })
}
