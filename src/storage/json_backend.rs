use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::{
    config,
    errors::RollupError,
    ledger::{Account, ArchivedTransaction, CommitCheckpoint, Summary, Transaction},
};

use super::{
    Book, HistoryFilter, LedgerStore, Result, TransactionFilter, CURRENT_SCHEMA_VERSION,
};

const BOOK_FILE: &str = "book.json";
const TMP_SUFFIX: &str = "tmp";

/// File-backed store persisting a single JSON document with the four ledger
/// collections plus commit checkpoints. Every mutation stages to a temporary
/// file and renames over the target.
#[derive(Clone)]
pub struct JsonStore {
    root: PathBuf,
    book_file: PathBuf,
}

impl JsonStore {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(config::app_data_dir);
        ensure_dir(&root)?;
        let book_file = root.join(BOOK_FILE);
        Ok(Self { root, book_file })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn book_path(&self) -> &Path {
        &self.book_file
    }

    fn read_book(&self) -> Result<Book> {
        if !self.book_file.exists() {
            return Ok(Book::default());
        }
        let data = fs::read_to_string(&self.book_file)?;
        let book: Book = serde_json::from_str(&data)?;
        if book.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(RollupError::Storage(format!(
                "book `{}` is from a newer schema version ({})",
                self.book_file.display(),
                book.schema_version
            )));
        }
        Ok(book)
    }

    fn write_book(&self, book: &Book) -> Result<()> {
        let json = serde_json::to_string_pretty(book)?;
        let tmp = tmp_path(&self.book_file);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.book_file)?;
        Ok(())
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut Book) -> Result<T>) -> Result<T> {
        let mut book = self.read_book()?;
        let value = op(&mut book)?;
        self.write_book(&book)?;
        Ok(value)
    }
}

impl LedgerStore for JsonStore {
    fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.read_book()?.accounts)
    }

    fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.read_book()?.get_account(id).cloned())
    }

    fn create_account(&self, account: Account) -> Result<()> {
        self.mutate(|book| {
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
        self.mutate(|book| book.set_opening_balance(id, opening_balance, expected_version))
    }

    fn create_transaction(&self, txn: Transaction) -> Result<()> {
        self.mutate(|book| {
            book.transactions.push(txn);
            Ok(())
        })
    }

    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let book = self.read_book()?;
        Ok(book
            .transactions
            .into_iter()
            .filter(|txn| filter.matches(txn))
            .collect())
    }

    fn delete_transaction(&self, id: Uuid) -> Result<()> {
        self.mutate(|book| book.delete_transaction(id))
    }

    fn create_history_entry(&self, entry: ArchivedTransaction) -> Result<()> {
        self.mutate(|book| {
            book.history.push(entry);
            Ok(())
        })
    }

    fn list_history(&self, filter: &HistoryFilter) -> Result<Vec<ArchivedTransaction>> {
        let book = self.read_book()?;
        Ok(book
            .history
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect())
    }

    fn delete_history_entry(&self, id: Uuid) -> Result<()> {
        self.mutate(|book| book.delete_history_entry(id))
    }

    fn create_summary(&self, summary: Summary) -> Result<()> {
        self.mutate(|book| {
            book.summaries.push(summary);
            Ok(())
        })
    }

    fn get_summary(&self, id: Uuid) -> Result<Option<Summary>> {
        let book = self.read_book()?;
        Ok(book.summaries.into_iter().find(|summary| summary.id == id))
    }

    fn list_summaries(&self) -> Result<Vec<Summary>> {
        Ok(self.read_book()?.summaries)
    }

    fn delete_summary(&self, id: Uuid) -> Result<()> {
        self.mutate(|book| book.delete_summary(id))
    }

    fn save_checkpoint(&self, checkpoint: &CommitCheckpoint) -> Result<()> {
        self.mutate(|book| {
            book.save_checkpoint(checkpoint);
            Ok(())
        })
    }

    fn list_checkpoints(&self) -> Result<Vec<CommitCheckpoint>> {
        Ok(self.read_book()?.checkpoints)
    }

    fn clear_checkpoint(&self, id: Uuid) -> Result<()> {
        self.mutate(|book| {
            book.checkpoints.retain(|checkpoint| checkpoint.id != id);
            Ok(())
        })
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
