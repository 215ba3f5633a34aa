mod common;

use common::*;

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use rollbook::{
    core::RollupEngine,
    errors::RollupError,
    ledger::{
        Account, ArchivedTransaction, CommitCheckpoint, CommitPhase, DateRange, Summary,
        Transaction,
    },
    storage::{HistoryFilter, LedgerStore, MemoryStore, TransactionFilter},
};
use uuid::Uuid;

/// Failure knobs shared between a test and its [`FlakyStore`].
#[derive(Default)]
struct Knobs {
    /// Original transaction ids whose archive write must fail.
    fail_archive_of: Mutex<Vec<Uuid>>,
    fail_create_summary: AtomicBool,
    /// Fails the next N live-transaction inserts (undo restore writes).
    fail_next_restores: AtomicUsize,
    /// Simulates a concurrent balance write landing mid-commit: bump this
    /// account's version on the first live-transaction delete.
    bump_version_of: Mutex<Option<Uuid>>,
    /// Fails the checkpoint write that records reaching this phase.
    fail_checkpoint_at_phase: Mutex<Option<CommitPhase>>,
}

struct FlakyStore {
    inner: MemoryStore,
    knobs: Arc<Knobs>,
}

impl FlakyStore {
    fn new(knobs: Arc<Knobs>) -> Self {
        Self {
            inner: MemoryStore::new(),
            knobs,
        }
    }
}

impl LedgerStore for FlakyStore {
    fn list_accounts(&self) -> rollbook::errors::Result<Vec<Account>> {
        self.inner.list_accounts()
    }

    fn get_account(&self, id: Uuid) -> rollbook::errors::Result<Option<Account>> {
        self.inner.get_account(id)
    }

    fn create_account(&self, account: Account) -> rollbook::errors::Result<()> {
        self.inner.create_account(account)
    }

    fn set_opening_balance(
        &self,
        id: Uuid,
        opening_balance: f64,
        expected_version: u64,
    ) -> rollbook::errors::Result<Account> {
        self.inner
            .set_opening_balance(id, opening_balance, expected_version)
    }

    fn create_transaction(&self, txn: Transaction) -> rollbook::errors::Result<()> {
        let remaining = self.knobs.fail_next_restores.load(Ordering::SeqCst);
        if remaining > 0 {
            self.knobs
                .fail_next_restores
                .store(remaining - 1, Ordering::SeqCst);
            return Err(RollupError::Storage("injected restore failure".into()));
        }
        self.inner.create_transaction(txn)
    }

    fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> rollbook::errors::Result<Vec<Transaction>> {
        self.inner.list_transactions(filter)
    }

    fn delete_transaction(&self, id: Uuid) -> rollbook::errors::Result<()> {
        if let Some(account_id) = self.knobs.bump_version_of.lock().unwrap().take() {
            let account = self
                .inner
                .get_account(account_id)?
                .expect("bump target exists");
            self.inner.set_opening_balance(
                account_id,
                account.opening_balance,
                account.version,
            )?;
        }
        self.inner.delete_transaction(id)
    }

    fn create_history_entry(&self, entry: ArchivedTransaction) -> rollbook::errors::Result<()> {
        if self
            .knobs
            .fail_archive_of
            .lock()
            .unwrap()
            .contains(&entry.original_id)
        {
            return Err(RollupError::Storage("injected archive failure".into()));
        }
        self.inner.create_history_entry(entry)
    }

    fn list_history(
        &self,
        filter: &HistoryFilter,
    ) -> rollbook::errors::Result<Vec<ArchivedTransaction>> {
        self.inner.list_history(filter)
    }

    fn delete_history_entry(&self, id: Uuid) -> rollbook::errors::Result<()> {
        self.inner.delete_history_entry(id)
    }

    fn create_summary(&self, summary: Summary) -> rollbook::errors::Result<()> {
        if self.knobs.fail_create_summary.load(Ordering::SeqCst) {
            return Err(RollupError::Storage("injected summary failure".into()));
        }
        self.inner.create_summary(summary)
    }

    fn get_summary(&self, id: Uuid) -> rollbook::errors::Result<Option<Summary>> {
        self.inner.get_summary(id)
    }

    fn list_summaries(&self) -> rollbook::errors::Result<Vec<Summary>> {
        self.inner.list_summaries()
    }

    fn delete_summary(&self, id: Uuid) -> rollbook::errors::Result<()> {
        self.inner.delete_summary(id)
    }

    fn save_checkpoint(&self, checkpoint: &CommitCheckpoint) -> rollbook::errors::Result<()> {
        if *self.knobs.fail_checkpoint_at_phase.lock().unwrap() == Some(checkpoint.phase) {
            return Err(RollupError::Storage("injected checkpoint failure".into()));
        }
        self.inner.save_checkpoint(checkpoint)
    }

    fn list_checkpoints(&self) -> rollbook::errors::Result<Vec<CommitCheckpoint>> {
        self.inner.list_checkpoints()
    }

    fn clear_checkpoint(&self, id: Uuid) -> rollbook::errors::Result<()> {
        self.inner.clear_checkpoint(id)
    }
}

fn flaky_engine() -> (RollupEngine, Arc<Knobs>) {
    let knobs = Arc::new(Knobs::default());
    let engine = RollupEngine::new(Box::new(FlakyStore::new(knobs.clone())));
    (engine, knobs)
}

#[test]
fn archive_failure_is_skipped_counted_and_does_not_abort_the_loop() {
    let (engine, knobs) = flaky_engine();
    let account = add_account(engine.store(), "A", 0.0);
    let date = day(2025, 1, 1);
    let poisoned = add_txn(engine.store(), account.id, date, "bad", deposit_flows(10.0));
    add_txn(engine.store(), account.id, date, "good one", deposit_flows(20.0));
    add_txn(engine.store(), account.id, date, "good two", deposit_flows(30.0));
    knobs.fail_archive_of.lock().unwrap().push(poisoned.id);

    let outcome = engine.commit(DateRange::single(date)).expect("commit");
    assert_eq!(outcome.report.archive_failures, 1);
    assert_eq!(outcome.report.archived, 2);
    assert!(!outcome.report.is_clean());

    // The skipped transaction stays live; the others were archived.
    let live = engine
        .store()
        .list_transactions(&TransactionFilter::default())
        .expect("list");
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, poisoned.id);
}

#[test]
fn summary_persist_failure_surfaces_orphaned_commit_with_checkpoint() {
    let (engine, knobs) = flaky_engine();
    let account = add_account(engine.store(), "A", 100.0);
    let date = day(2025, 2, 2);
    add_txn(engine.store(), account.id, date, "in", deposit_flows(50.0));
    knobs.fail_create_summary.store(true, Ordering::SeqCst);

    let err = engine
        .commit(DateRange::single(date))
        .expect_err("commit must surface the orphan");
    let checkpoint_id = match err {
        RollupError::OrphanedCommit { checkpoint, .. } => checkpoint,
        other => panic!("expected OrphanedCommit, got {other}"),
    };

    // Destructive phases already ran: balance advanced, transaction archived,
    // but no summary exists, and the checkpoint records how far we got.
    let account = engine
        .store()
        .get_account(account.id)
        .expect("get")
        .expect("present");
    assert_eq!(account.opening_balance, 150.0);
    assert!(engine.store().list_summaries().expect("summaries").is_empty());

    let checkpoints = engine.store().list_checkpoints().expect("checkpoints");
    assert_eq!(checkpoints.len(), 1);
    assert_eq!(checkpoints[0].id, checkpoint_id);
    assert_eq!(checkpoints[0].phase, CommitPhase::BalancesAdvanced);
}

#[test]
fn checkpoint_persist_failure_after_archive_surfaces_orphaned_commit() {
    let (engine, knobs) = flaky_engine();
    let account = add_account(engine.store(), "A", 100.0);
    let date = day(2025, 2, 3);
    add_txn(engine.store(), account.id, date, "in", deposit_flows(40.0));
    *knobs.fail_checkpoint_at_phase.lock().unwrap() = Some(CommitPhase::TransactionsArchived);

    let err = engine
        .commit(DateRange::single(date))
        .expect_err("commit must surface the orphan");
    let checkpoint_id = match err {
        RollupError::OrphanedCommit { checkpoint, .. } => checkpoint,
        other => panic!("expected OrphanedCommit, got {other}"),
    };

    // The archive already ran, so the transaction is gone from the live set,
    // no summary exists, and the stored checkpoint still names the phase the
    // run last managed to persist.
    assert!(engine
        .store()
        .list_transactions(&TransactionFilter::default())
        .expect("list")
        .is_empty());
    assert!(engine.store().list_summaries().expect("summaries").is_empty());

    let checkpoints = engine.store().list_checkpoints().expect("checkpoints");
    assert_eq!(checkpoints.len(), 1);
    assert_eq!(checkpoints[0].id, checkpoint_id);
    assert_eq!(checkpoints[0].phase, CommitPhase::Pending);
}

#[test]
fn concurrent_balance_write_mid_commit_is_rejected_as_stale() {
    let (engine, knobs) = flaky_engine();
    let account = add_account(engine.store(), "A", 100.0);
    let date = day(2025, 3, 3);
    add_txn(engine.store(), account.id, date, "in", deposit_flows(25.0));
    *knobs.bump_version_of.lock().unwrap() = Some(account.id);

    let outcome = engine.commit(DateRange::single(date)).expect("commit");
    assert_eq!(outcome.report.account_failures, 1);
    assert_eq!(outcome.report.accounts_advanced, 0);

    // The stale write did not land: the balance still reflects the
    // interleaved writer, not the roll-up.
    let current = engine
        .store()
        .get_account(account.id)
        .expect("get")
        .expect("present");
    assert_eq!(current.opening_balance, 100.0);
    assert_eq!(current.version, 1);
}

#[test]
fn partially_failed_undo_reports_counts_and_retries_to_completion() {
    let (engine, knobs) = flaky_engine();
    let account = add_account(engine.store(), "A", 0.0);
    let date = day(2025, 4, 4);
    add_txn(engine.store(), account.id, date, "one", deposit_flows(10.0));
    add_txn(engine.store(), account.id, date, "two", deposit_flows(20.0));
    let outcome = engine.commit(DateRange::single(date)).expect("commit");

    // First restore write fails; the loop must keep going and the summary
    // must survive so the undo can be retried.
    knobs.fail_next_restores.store(1, Ordering::SeqCst);
    let report = engine.undo(outcome.summary.id).expect("undo");
    assert!(!report.ok);
    assert_eq!(report.restored, 1);
    assert_eq!(report.restore_failures, 1);
    assert!(engine
        .store()
        .get_summary(outcome.summary.id)
        .expect("get summary")
        .is_some());

    // Retry completes the remainder without duplicating the already-restored
    // transaction, then removes the summary.
    let retry = engine.undo(outcome.summary.id).expect("retry");
    assert!(retry.ok);
    assert_eq!(retry.restored, 1);
    let live = engine
        .store()
        .list_transactions(&TransactionFilter::default())
        .expect("list");
    assert_eq!(live.len(), 2);
    assert!(engine
        .store()
        .get_summary(outcome.summary.id)
        .expect("get summary")
        .is_none());

    // A third undo finds nothing.
    let err = engine.undo(outcome.summary.id).expect_err("summary gone");
    assert!(matches!(err, RollupError::SummaryNotFound(_)));
}
