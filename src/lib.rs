#![doc(test(attr(deny(warnings))))]

//! Expense Tracker Core keeps per-category monthly budgets alongside recorded
//! expenses: lazy month provisioning, rollover of unspent budget, legacy data
//! migration, and the derived spending analytics built on top of them.

pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

pub use crate::config::{ConfigManager, TrackerConfig};
pub use crate::core::{Clock, ExpenseTracker, FixedClock, SystemClock};
pub use crate::errors::{Result, TrackerError};
pub use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        let build = utils::build_info::current();
        tracing::info!(
            version = build.version,
            git = build.git_hash,
            profile = build.profile,
            built = build.timestamp,
            "Expense Tracker Core tracing initialized."
        );
    });
}
