#![doc(test(attr(deny(warnings))))]

//! Rollbook folds date ranges of ledger transactions into immutable
//! summaries, archiving the source rows and advancing account opening
//! balances, and can reverse a committed summary back out.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::from_default_env().add_directive("rollbook=info".parse().unwrap());
        // Logs go to stderr; the CLI reserves stdout for machine-readable JSON.
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        tracing::info!("Rollbook tracing initialized.");
    });
}
