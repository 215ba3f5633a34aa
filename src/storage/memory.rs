use std::sync::Mutex;

use uuid::Uuid;

use crate::{
    errors::RollupError,
    ledger::{Account, ArchivedTransaction, CommitCheckpoint, Summary, Transaction},
};

use super::{Book, HistoryFilter, LedgerStore, Result, TransactionFilter};

/// In-process store over a mutex-guarded [`Book`]. Used by tests and the
/// CLI's ephemeral mode; behaviorally identical to [`super::JsonStore`]
/// minus durability.
#[derive(Default)]
pub struct MemoryStore {
    book: Mutex<Book>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_book<T>(&self, op: impl FnOnce(&mut Book) -> Result<T>) -> Result<T> {
        let mut book = self
            .book
            .lock()
            .map_err(|_| RollupError::Storage("memory store poisoned".into()))?;
        op(&mut book)
    }
}

impl LedgerStore for MemoryStore {
    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.with_book(|book| Ok(book.accounts.clone()))
    }

    fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        self.with_book(|book| Ok(book.get_account(id).cloned()))
    }

    fn create_account(&self, account: Account) -> Result<()> {
        self.with_book(|book| {
            book.accounts.push(account);
            Ok(())
        })
    }

    fn set_opening_balance(
        &self,
        id: Uuid,
        opening_balance: f64,
        expected_version: u64,
    ) -> Result<Account> {
        self.with_book(|book| book.set_opening_balance(id, opening_balance, expected_version))
    }

    fn create_transaction(&self, txn: Transaction) -> Result<()> {
        self.with_book(|book| {
            book.transactions.push(txn);
            Ok(())
        })
    }

    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        self.with_book(|book| {
            Ok(book
                .transactions
                .iter()
                .filter(|txn| filter.matches(txn))
                .cloned()
                .collect())
        })
    }

    fn delete_transaction(&self, id: Uuid) -> Result<()> {
        self.with_book(|book| book.delete_transaction(id))
    }

    fn create_history_entry(&self, entry: ArchivedTransaction) -> Result<()> {
        self.with_book(|book| {
            book.history.push(entry);
            Ok(())
        })
    }

    fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<ArchivedTransaction>> {
        self.with_book(|book| {
            Ok(book
                .history
                .iter()
                .filter(|entry| filter.matches(entry))
                .cloned()
                .collect())
        })
    }

    fn delete_history_entry(&self, id: Uuid) -> Result<()> {
        self.with_book(|book| book.delete_history_entry(id))
    }

    fn create_summary(&self, summary: Summary) -> Result<()> {
        self.with_book(|book| {
            book.summaries.push(summary);
            Ok(())
        })
    }

    fn get_summary(&self, id: Uuid) -> Result<Option<Summary>> {
        self.with_book(|book| {
            Ok(book
                .summaries
                .iter()
                .find(|summary| summary.id == id)
                .cloned())
        })
    }

    fn list_summaries(&self) -> Result<Vec<Summary>> {
        self.with_book(|book| Ok(book.summaries.clone()))
    }

    fn delete_summary(&self, id: Uuid) -> Result<()> {
        self.with_book(|book| book.delete_summary(id))
    }

    fn save_checkpoint(&self, checkpoint: &CommitCheckpoint) -> Result<()> {
        self.with_book(|book| {
            book.save_checkpoint(checkpoint);
            Ok(())
        })
    }

    fn list_checkpoints(&self) -> Result<Vec<CommitCheckpoint>> {
        self.with_book(|book| Ok(book.checkpoints.clone()))
    }

    fn clear_checkpoint(&self, id: Uuid) -> Result<()> {
        self.with_book(|book| {
            book.checkpoints.retain(|checkpoint| checkpoint.id != id);
            Ok(())
        })
    }
}
