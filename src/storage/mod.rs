pub mod json_backend;
pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::RollupError;
use crate::ledger::{
    Account, ArchivedTransaction, CommitCheckpoint, DateRange, Summary, Transaction,
};

pub type Result<T> = crate::errors::Result<T>;

/// Live-transaction query shape used by the aggregation and undo paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    pub account_id: Option<Uuid>,
    pub range: Option<DateRange>,
    pub rolled: Option<bool>,
    /// Exact-day match, used when clearing synthetic closing entries.
    pub date: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(account_id) = self.account_id {
            if txn.account_id != account_id {
                return false;
            }
        }
        if let Some(range) = self.range {
            if !range.contains(txn.date) {
                return false;
            }
        }
        if let Some(rolled) = self.rolled {
            if txn.rolled != rolled {
                return false;
            }
        }
        if let Some(date) = self.date {
            if txn.date != date {
                return false;
            }
        }
        true
    }
}

/// Archive query shape: entries belonging to one committed range, optionally
/// narrowed to an account.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub range: Option<DateRange>,
    pub account_id: Option<Uuid>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &ArchivedTransaction) -> bool {
        if let Some(range) = self.range {
            if entry.range != range {
                return false;
            }
        }
        if let Some(account_id) = self.account_id {
            if entry.account_id != account_id {
                return false;
            }
        }
        true
    }
}

/// Abstraction over persistence backends holding the four ledger collections
/// plus in-flight commit checkpoints.
///
/// The handle is constructed explicitly and passed in; there is no ambient
/// global store.
pub trait LedgerStore: Send + Sync {
    fn list_accounts(&self) -> Result<Vec<Account>>;
    fn get_account(&self, id: Uuid) -> Result<Option<Account>>;
    fn create_account(&self, account: Account) -> Result<()>;
    /// Guarded balance write: fails with [`crate::errors::RollupError::StaleAccount`]
    /// when `expected_version` no longer matches the stored account.
    fn set_opening_balance(
        &self,
        id: Uuid,
        opening_balance: f64,
        expected_version: u64,
    ) -> Result<Account>;

    fn create_transaction(&self, txn: Transaction) -> Result<()>;
    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;
    fn delete_transaction(&self, id: Uuid) -> Result<()>;

    fn create_history_entry(&self, entry: ArchivedTransaction) -> Result<()>;
    fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<ArchivedTransaction>>;
    fn delete_history_entry(&self, id: Uuid) -> Result<()>;

    fn create_summary(&self, summary: Summary) -> Result<()>;
    fn get_summary(&self, id: Uuid) -> Result<Option<Summary>>;
    fn list_summaries(&self) -> Result<Vec<Summary>>;
    fn delete_summary(&self, id: Uuid) -> Result<()>;

    /// Upserts the checkpoint by id.
    fn save_checkpoint(&self, checkpoint: &CommitCheckpoint) -> Result<()>;
    fn list_checkpoints(&self) -> Result<Vec<CommitCheckpoint>>;
    fn clear_checkpoint(&self, id: Uuid) -> Result<()>;
}

/// On-disk document holding every collection the store manages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub history: Vec<ArchivedTransaction>,
    #[serde(default)]
    pub summaries: Vec<Summary>,
    #[serde(default)]
    pub checkpoints: Vec<CommitCheckpoint>,
}

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

impl Book {
    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn get_account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn set_opening_balance(
        &mut self,
        id: Uuid,
        opening_balance: f64,
        expected_version: u64,
    ) -> Result<Account> {
        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or(RollupError::AccountNotFound(id))?;
        if account.version != expected_version {
            return Err(RollupError::StaleAccount {
                id,
                expected: expected_version,
                actual: account.version,
            });
        }
        account.advance_balance(opening_balance);
        Ok(account.clone())
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> Result<()> {
        let before = self.transactions.len();
        self.transactions.retain(|txn| txn.id != id);
        if self.transactions.len() == before {
            return Err(RollupError::TransactionNotFound(id));
        }
        Ok(())
    }

    pub fn delete_history_entry(&mut self, id: Uuid) -> Result<()> {
        let before = self.history.len();
        self.history.retain(|entry| entry.id != id);
        if self.history.len() == before {
            return Err(RollupError::HistoryNotFound(id));
        }
        Ok(())
    }

    pub fn delete_summary(&mut self, id: Uuid) -> Result<()> {
        let before = self.summaries.len();
        self.summaries.retain(|summary| summary.id != id);
        if self.summaries.len() == before {
            return Err(RollupError::SummaryNotFound(id));
        }
        Ok(())
    }

    pub fn save_checkpoint(&mut self, checkpoint: &CommitCheckpoint) {
        match self
            .checkpoints
            .iter_mut()
            .find(|existing| existing.id == checkpoint.id)
        {
            Some(existing) => *existing = checkpoint.clone(),
            None => self.checkpoints.push(checkpoint.clone()),
        }
    }
}

pub use json_backend::JsonStore;
pub use memory::MemoryStore;
