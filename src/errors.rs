use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Error type that captures roll-up, reversal, and storage failures.
#[derive(Debug, Error)]
pub enum RollupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Summary not found: {0}")]
    SummaryNotFound(Uuid),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("History entry not found: {0}")]
    HistoryNotFound(Uuid),
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("Stale account {id}: expected version {expected}, found {actual}")]
    StaleAccount {
        id: Uuid,
        expected: u64,
        actual: u64,
    },
    #[error("Commit orphaned: destructive phases ran but no summary was persisted (checkpoint {checkpoint}): {reason}")]
    OrphanedCommit { checkpoint: Uuid, reason: String },
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, RollupError>;
