use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ledger account whose opening balance is advanced by committed summaries.
///
/// `version` is an optimistic-concurrency token: every balance write names the
/// version it read, and the store rejects writes against a stale version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub opening_balance: f64,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, opening_balance: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            opening_balance,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a guarded balance write, bumping the version token.
    pub fn advance_balance(&mut self, opening_balance: f64) {
        self.opening_balance = opening_balance;
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
