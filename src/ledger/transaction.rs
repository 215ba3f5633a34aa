use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::flows::Flows;

/// A live ledger entry. Committed ranges move these into
/// [`super::ArchivedTransaction`]; a transaction is live or archived, never
/// both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub flows: Flows,
    /// Marks synthetic closing entries written by roll flows; undo removes
    /// rolled entries dated on the range end.
    #[serde(default)]
    pub rolled: bool,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        date: NaiveDate,
        description: impl Into<String>,
        flows: Flows,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            date,
            description: description.into(),
            flows,
            rolled: false,
            created_at: Utc::now(),
        }
    }

    pub fn net(&self) -> f64 {
        self.flows.net()
    }
}
