//! Roll-up engines: preview, commit, and undo over a [`LedgerStore`].

pub mod aggregator;
pub mod balance;
pub mod commit;
pub mod undo;

use uuid::Uuid;

use crate::{ledger::DateRange, storage::LedgerStore};

pub use aggregator::{aggregate_range, RangeAggregate, RangePreview};
pub use balance::{running_balances, totals_for, AccountTotals, RunningBalance};
pub use commit::{CommitOutcome, CommitReport};
pub use undo::UndoReport;

pub type Result<T> = crate::errors::Result<T>;

/// Facade coordinating aggregation, commit, and reversal against one store
/// handle. The store is passed in explicitly; the engine holds no other
/// state.
pub struct RollupEngine {
    store: Box<dyn LedgerStore>,
}

impl RollupEngine {
    pub fn new(store: Box<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    /// Side-effect-free projection of what committing `range` would produce.
    pub fn preview(&self, range: DateRange) -> Result<RangePreview> {
        aggregate_range(self.store.as_ref(), range).map(RangePreview::from)
    }

    /// Rolls `range` into an immutable summary, archiving its transactions
    /// and advancing account opening balances.
    pub fn commit(&self, range: DateRange) -> Result<CommitOutcome> {
        commit::commit_range(self.store.as_ref(), range)
    }

    /// Reverses a committed summary by id.
    pub fn undo(&self, summary_id: Uuid) -> Result<UndoReport> {
        undo::undo_summary(self.store.as_ref(), summary_id)
    }
}
