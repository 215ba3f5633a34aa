//! Turns a range aggregation into a durable state transition: archive the
//! matched transactions, advance account balances, persist the summary.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    errors::RollupError,
    ledger::{ArchivedTransaction, CommitCheckpoint, CommitPhase, DateRange, Summary},
    storage::LedgerStore,
};

use super::{aggregator::aggregate_range, Result};

/// Per-item outcome counts for one commit. Individual archive or balance
/// failures do not abort the commit; they are logged, skipped, and reported
/// here so partial success stays observable.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CommitReport {
    pub archived: usize,
    pub archive_failures: usize,
    pub accounts_advanced: usize,
    pub account_failures: usize,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.archive_failures == 0 && self.account_failures == 0
    }
}

#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub summary: Summary,
    pub report: CommitReport,
}

/// Commits `range`. Phase order matters: archive, then balances, then the
/// summary record, with the checkpoint persisted between phases so an
/// interrupted run stays inspectable. Once the archive phase has run, a
/// failure persisting the checkpoint or the summary is surfaced as
/// [`RollupError::OrphanedCommit`] with the checkpoint left in place.
/// Persists a phase advance reached after destructive work. A failure here
/// leaves the stored checkpoint naming an earlier phase than what actually
/// ran, so it is reported as an orphaned commit rather than a plain error.
fn mark_phase(store: &dyn LedgerStore, checkpoint: &CommitCheckpoint) -> Result<()> {
    store.save_checkpoint(checkpoint).map_err(|err| {
        error!(checkpoint = %checkpoint.id, phase = ?checkpoint.phase, %err,
            "checkpoint persist failed after a destructive phase; commit is orphaned");
        RollupError::OrphanedCommit {
            checkpoint: checkpoint.id,
            reason: err.to_string(),
        }
    })
}

pub fn commit_range(store: &dyn LedgerStore, range: DateRange) -> Result<CommitOutcome> {
    let aggregate = aggregate_range(store, range)?;
    let mut checkpoint = CommitCheckpoint::new(range);
    store.save_checkpoint(&checkpoint)?;

    let mut report = CommitReport::default();
    let archived_at = Utc::now();
    for txn in &aggregate.transactions {
        let entry = ArchivedTransaction::from_transaction(txn, range, archived_at);
        let result = store
            .create_history_entry(entry)
            .and_then(|()| store.delete_transaction(txn.id));
        match result {
            Ok(()) => report.archived += 1,
            Err(err) => {
                warn!(txn = %txn.id, account = %txn.account_id, %err,
                    "failed to archive transaction, skipping");
                report.archive_failures += 1;
            }
        }
    }
    checkpoint.advance(CommitPhase::TransactionsArchived);
    mark_phase(store, &checkpoint)?;

    for entry in &aggregate.per_account {
        let expected = aggregate
            .account_versions
            .get(&entry.account_id)
            .copied()
            .unwrap_or_default();
        match store.set_opening_balance(entry.account_id, entry.opening_after, expected) {
            Ok(_) => report.accounts_advanced += 1,
            Err(err) => {
                warn!(account = %entry.account_id, %err,
                    "failed to advance opening balance, skipping");
                report.account_failures += 1;
            }
        }
    }
    checkpoint.advance(CommitPhase::BalancesAdvanced);
    mark_phase(store, &checkpoint)?;

    let summary = Summary::new(range, aggregate.per_account, aggregate.txn_count);
    if let Err(err) = store.create_summary(summary.clone()) {
        error!(checkpoint = %checkpoint.id, range = %range, %err,
            "summary persist failed after archive and balance phases; commit is orphaned");
        return Err(RollupError::OrphanedCommit {
            checkpoint: checkpoint.id,
            reason: err.to_string(),
        });
    }

    checkpoint.advance(CommitPhase::Complete);
    if let Err(err) = store.clear_checkpoint(checkpoint.id) {
        warn!(checkpoint = %checkpoint.id, %err,
            "commit complete but checkpoint could not be removed");
    }

    info!(summary = %summary.id, range = %range,
        archived = report.archived, failures = report.archive_failures,
        "committed range");
    Ok(CommitOutcome { summary, report })
}
