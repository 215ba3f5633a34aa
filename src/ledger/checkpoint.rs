use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::date_range::DateRange;

/// How far a commit progressed through its destructive phases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommitPhase {
    /// Aggregation done, nothing mutated yet.
    Pending,
    /// Matched transactions copied to history and deleted.
    TransactionsArchived,
    /// Account opening balances rewritten to their post-roll values.
    BalancesAdvanced,
    /// Summary persisted; the checkpoint is removed at this point.
    Complete,
}

/// Persisted saga marker for an in-flight commit.
///
/// Written before the first destructive step and advanced after each phase,
/// so a crash mid-commit leaves an inspectable record instead of silently
/// orphaned state. A checkpoint stuck at `BalancesAdvanced` means
/// transactions were archived and balances moved but no summary exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitCheckpoint {
    pub id: Uuid,
    pub range: DateRange,
    pub phase: CommitPhase,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommitCheckpoint {
    pub fn new(range: DateRange) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            range,
            phase: CommitPhase::Pending,
            started_at: now,
            updated_at: now,
        }
    }

    pub fn advance(&mut self, phase: CommitPhase) {
        self.phase = phase;
        self.updated_at = Utc::now();
    }
}
