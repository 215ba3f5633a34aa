use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{date_range::DateRange, flows::Flows};

/// Per-account slice of a committed or previewed roll-up.
///
/// Invariants: `net == totals.credits() - totals.debits()` and
/// `opening_after == opening_before + net`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRollup {
    pub account_id: Uuid,
    /// Name snapshot taken at aggregation time; account renames after the
    /// commit do not rewrite history.
    pub account_name: String,
    pub opening_before: f64,
    pub txn_count: usize,
    pub totals: Flows,
    pub net: f64,
    pub opening_after: f64,
}

/// Aggregate across every account in a roll-up; field-wise sum of the
/// per-account entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OverallRollup {
    pub totals: Flows,
    pub net: f64,
}

impl OverallRollup {
    pub fn fold(per_account: &[AccountRollup]) -> Self {
        let mut overall = OverallRollup::default();
        for entry in per_account {
            overall.totals.accumulate(&entry.totals);
            overall.net += entry.net;
        }
        overall
    }
}

/// Immutable record of a committed range: what was rolled up, per account and
/// overall, and the balances it moved. Deleted whole by undo, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub id: Uuid,
    pub range: DateRange,
    pub created_at: DateTime<Utc>,
    pub per_account: Vec<AccountRollup>,
    pub overall: OverallRollup,
    pub txn_count: usize,
}

impl Summary {
    pub fn new(range: DateRange, per_account: Vec<AccountRollup>, txn_count: usize) -> Self {
        let overall = OverallRollup::fold(&per_account);
        Self {
            id: Uuid::new_v4(),
            range,
            created_at: Utc::now(),
            per_account,
            overall,
            txn_count,
        }
    }
}
