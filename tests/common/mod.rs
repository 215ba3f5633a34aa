use chrono::NaiveDate;
use uuid::Uuid;

use rollbook::{
    core::RollupEngine,
    ledger::{Account, Flows, Transaction},
    storage::{LedgerStore, MemoryStore},
};

/// Engine over a fresh in-memory store.
pub fn engine() -> RollupEngine {
    RollupEngine::new(Box::new(MemoryStore::new()))
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn add_account(store: &dyn LedgerStore, name: &str, opening: f64) -> Account {
    let account = Account::new(name, opening);
    store
        .create_account(account.clone())
        .expect("create account");
    account
}

pub fn deposit_flows(amount: f64) -> Flows {
    Flows {
        deposit: amount,
        ..Flows::default()
    }
}

pub fn penal_flows(amount: f64) -> Flows {
    Flows {
        penal_withdrawal: amount,
        ..Flows::default()
    }
}

pub fn add_txn(
    store: &dyn LedgerStore,
    account_id: Uuid,
    date: NaiveDate,
    description: &str,
    flows: Flows,
) -> Transaction {
    let txn = Transaction::new(account_id, date, description, flows);
    store
        .create_transaction(txn.clone())
        .expect("create transaction");
    txn
}
