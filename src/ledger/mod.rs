//! Ledger domain models, persistence-friendly types, and helpers.

pub mod account;
pub mod checkpoint;
pub mod date_range;
pub mod flows;
pub mod history;
pub mod summary;
pub mod transaction;

pub use account::Account;
pub use checkpoint::{CommitCheckpoint, CommitPhase};
pub use date_range::DateRange;
pub use flows::Flows;
pub use history::ArchivedTransaction;
pub use summary::{AccountRollup, OverallRollup, Summary};
pub use transaction::Transaction;
