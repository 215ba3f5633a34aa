//! Best-effort inverse of a committed summary: restore archived
//! transactions, clear synthetic closing rows, revert opening balances,
//! delete the summary record.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    errors::RollupError,
    storage::{HistoryFilter, LedgerStore, TransactionFilter},
};

use super::Result;

use uuid::Uuid;

/// Per-item outcome counts for one undo. `ok` is true only when every
/// restore and balance step succeeded; partial failures are still reported
/// rather than hidden behind an unconditional success.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UndoReport {
    pub ok: bool,
    pub restored: usize,
    pub restore_failures: usize,
    pub accounts_reverted: usize,
    pub account_failures: usize,
    pub rolled_cleared: usize,
}

/// Reverses `summary_id`. A missing summary aborts; per-item failures are
/// logged, counted, and skipped. Retrying a partially-failed undo is safe:
/// history rows already restored are gone, so only the remainder is
/// reprocessed.
pub fn undo_summary(store: &dyn LedgerStore, summary_id: Uuid) -> Result<UndoReport> {
    let summary = store
        .get_summary(summary_id)?
        .ok_or(RollupError::SummaryNotFound(summary_id))?;
    let range = summary.range;
    let mut report = UndoReport::default();

    for entry in &summary.per_account {
        let filter = HistoryFilter {
            range: Some(range),
            account_id: Some(entry.account_id),
        };
        let archived = match store.list_history(&filter) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(account = %entry.account_id, %err,
                    "failed to list archived transactions, skipping account");
                report.restore_failures += 1;
                continue;
            }
        };
        for item in archived {
            let result = store
                .create_transaction(item.restore())
                .and_then(|()| store.delete_history_entry(item.id));
            match result {
                Ok(()) => report.restored += 1,
                Err(err) => {
                    warn!(entry = %item.id, original = %item.original_id, %err,
                        "failed to restore archived transaction, skipping");
                    report.restore_failures += 1;
                }
            }
        }
    }

    // Synthetic closing rows written at commit time are dated on the range
    // end and flagged rolled; they have no archive counterpart to restore.
    for entry in &summary.per_account {
        let filter = TransactionFilter {
            account_id: Some(entry.account_id),
            rolled: Some(true),
            date: Some(range.end),
            ..TransactionFilter::default()
        };
        let rolled = store.list_transactions(&filter).unwrap_or_default();
        for txn in rolled {
            match store.delete_transaction(txn.id) {
                Ok(()) => report.rolled_cleared += 1,
                Err(err) => {
                    debug!(txn = %txn.id, %err, "could not clear rolled closing entry");
                }
            }
        }
    }

    for entry in &summary.per_account {
        let current = match store.get_account(entry.account_id) {
            Ok(Some(account)) => account,
            Ok(None) => {
                warn!(account = %entry.account_id, "account missing, cannot revert balance");
                report.account_failures += 1;
                continue;
            }
            Err(err) => {
                warn!(account = %entry.account_id, %err, "failed to load account, skipping");
                report.account_failures += 1;
                continue;
            }
        };
        match store.set_opening_balance(entry.account_id, entry.opening_before, current.version) {
            Ok(_) => report.accounts_reverted += 1,
            Err(err) => {
                warn!(account = %entry.account_id, %err,
                    "failed to revert opening balance, skipping");
                report.account_failures += 1;
            }
        }
    }

    // The summary record goes last, and only after a clean pass: retaining
    // it on partial failure keeps the remaining history rows attached to a
    // summary and lets the caller retry the undo to completion.
    if report.restore_failures == 0 && report.account_failures == 0 {
        store.delete_summary(summary.id)?;
        report.ok = true;
    } else {
        warn!(summary = %summary.id,
            restore_failures = report.restore_failures,
            account_failures = report.account_failures,
            "undo incomplete; summary retained so the operation can be retried");
    }

    info!(summary = %summary.id, range = %range,
        restored = report.restored, failures = report.restore_failures,
        ok = report.ok, "undo finished");
    Ok(report)
}
