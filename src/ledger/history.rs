use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{date_range::DateRange, flows::Flows, transaction::Transaction};

/// Archive copy of a transaction folded into a committed summary.
///
/// Every entry's `range` matches exactly one persisted summary; replaying a
/// summary's entries against its pre-commit opening balances reproduces the
/// summary's aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchivedTransaction {
    pub id: Uuid,
    /// Transaction id before archival.
    pub original_id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub flows: Flows,
    #[serde(default)]
    pub rolled: bool,
    pub range: DateRange,
    pub archived_at: DateTime<Utc>,
}

impl ArchivedTransaction {
    /// Archive copy of a live transaction, stamped with the committed range.
    pub fn from_transaction(txn: &Transaction, range: DateRange, archived_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_id: txn.id,
            account_id: txn.account_id,
            date: txn.date,
            description: txn.description.clone(),
            flows: txn.flows,
            rolled: txn.rolled,
            range,
            archived_at,
        }
    }

    /// Rebuilds a live transaction from this entry, dropping the
    /// archive-only fields. The restored transaction gets a fresh id.
    pub fn restore(&self) -> Transaction {
        let mut txn = Transaction::new(
            self.account_id,
            self.date,
            self.description.clone(),
            self.flows,
        );
        txn.rolled = self.rolled;
        txn
    }
}
