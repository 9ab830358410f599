//! Key-value persistence used by the tracker, plus the versioned payload loaders.

pub mod json_backend;
pub mod memory;
pub mod schema;

use crate::errors::Result;

/// Minimal string key-value capability the tracker persists through.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
pub use schema::{
    load_budgets, load_expenses, save_budgets, save_expenses, BudgetLoadReport, BudgetSource,
    PersistedBudgets, StorageKeys,
};
