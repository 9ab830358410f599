//! Versioned persisted layout and the loader that dispatches over it.
//!
//! Budgets live under a versioned key holding a JSON array of records. Older
//! installs kept a single `{categoryId: amount}` object under the legacy key;
//! it is migrated once, written back under the versioned key, then removed.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{info, warn};

use crate::core::services::{BudgetService, LegacyBudgets, MigrationService, ProvisionContext};
use crate::core::time::Clock;
use crate::domain::{record_id, BudgetRecord, BudgetTemplate, Category, Expense, Month};
use crate::errors::{Result, TrackerError};

use super::KeyValueStore;

/// Storage key names.
pub struct StorageKeys;

impl StorageKeys {
    pub const BUDGETS_V2: &'static str = "budgets_v2";
    pub const LEGACY_BUDGETS: &'static str = "budgets";
    pub const EXPENSES: &'static str = "expenses";
    pub const SETTINGS: &'static str = "settings";

    pub const ALL: [&'static str; 4] = [
        Self::BUDGETS_V2,
        Self::LEGACY_BUDGETS,
        Self::EXPENSES,
        Self::SETTINGS,
    ];
}

/// What the store currently holds for budgets.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistedBudgets {
    Current(Vec<Value>),
    Legacy(LegacyBudgets),
    Absent,
}

/// Where the loaded budget records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetSource {
    Current,
    MigratedLegacy,
    Defaults,
    /// The store could not be read; defaults are held in memory only.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetLoadReport {
    pub records: Vec<BudgetRecord>,
    pub source: BudgetSource,
    pub warnings: Vec<String>,
}

/// Reads the budget keys, discarding (and removing) payloads that fail to parse
/// or have the wrong shape. Only read failures of the store itself are errors.
pub fn detect_budgets(
    store: &dyn KeyValueStore,
    warnings: &mut Vec<String>,
) -> Result<PersistedBudgets> {
    if let Some(raw) = store.get(StorageKeys::BUDGETS_V2)? {
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => return Ok(PersistedBudgets::Current(items)),
            Ok(_) => discard(store, StorageKeys::BUDGETS_V2, "expected a JSON array", warnings),
            Err(err) => discard(store, StorageKeys::BUDGETS_V2, &err.to_string(), warnings),
        }
        return Ok(PersistedBudgets::Absent);
    }

    if let Some(raw) = store.get(StorageKeys::LEGACY_BUDGETS)? {
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => return Ok(PersistedBudgets::Legacy(map)),
            Ok(_) => discard(store, StorageKeys::LEGACY_BUDGETS, "expected a JSON object", warnings),
            Err(err) => discard(store, StorageKeys::LEGACY_BUDGETS, &err.to_string(), warnings),
        }
    }

    Ok(PersistedBudgets::Absent)
}

/// Loads budget records, migrating legacy data or synthesizing defaults for
/// the current month as needed. Never fails: when the store cannot be read the
/// report carries in-memory defaults and `BudgetSource::Unavailable`.
pub fn load_budgets(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    categories: &[Category],
    template: &BudgetTemplate,
) -> BudgetLoadReport {
    let mut warnings = Vec::new();
    let ctx = ProvisionContext {
        categories,
        template,
        now: clock.now(),
    };
    let persisted = match detect_budgets(store, &mut warnings) {
        Ok(persisted) => persisted,
        Err(err) => {
            push_warning(&mut warnings, format!("reading budgets failed: {}", err));
            return BudgetLoadReport {
                records: BudgetService::default_records(Month::current(clock), &ctx),
                source: BudgetSource::Unavailable,
                warnings,
            };
        }
    };

    match persisted {
        PersistedBudgets::Current(items) => {
            let records = parse_records(items, &mut warnings);
            BudgetLoadReport {
                records,
                source: BudgetSource::Current,
                warnings,
            }
        }
        PersistedBudgets::Legacy(map) => {
            let records = MigrationService::migrate_legacy(&map, None, clock);
            match write_records(store, &records) {
                Ok(()) => {
                    if let Err(err) = store.remove(StorageKeys::LEGACY_BUDGETS) {
                        warn!(error = %err, "removing legacy budgets failed");
                        warnings.push(format!("removing legacy budgets failed: {}", err));
                    }
                }
                Err(err) => {
                    // Legacy data stays put so the migration can run again next load.
                    warn!(error = %err, "saving migrated budgets failed");
                    warnings.push(format!("saving migrated budgets failed: {}", err));
                }
            }
            BudgetLoadReport {
                records,
                source: BudgetSource::MigratedLegacy,
                warnings,
            }
        }
        PersistedBudgets::Absent => {
            let records = BudgetService::default_records(Month::current(clock), &ctx);
            info!(count = records.len(), "synthesized default budgets");
            BudgetLoadReport {
                records,
                source: BudgetSource::Defaults,
                warnings,
            }
        }
    }
}

pub fn save_budgets(store: &dyn KeyValueStore, records: &[BudgetRecord]) -> Result<()> {
    write_records(store, records)
}

/// Loads expenses. A payload that is not a JSON array is discarded; inside an
/// array, entries that fail to deserialize are dropped one by one. Only a
/// failed store read is an error.
pub fn load_expenses(store: &dyn KeyValueStore, warnings: &mut Vec<String>) -> Result<Vec<Expense>> {
    let raw = match store.get(StorageKeys::EXPENSES)? {
        Some(raw) => raw,
        None => return Ok(Vec::new()),
    };
    let items = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            discard(store, StorageKeys::EXPENSES, "expected a JSON array", warnings);
            return Ok(Vec::new());
        }
        Err(err) => {
            discard(store, StorageKeys::EXPENSES, &err.to_string(), warnings);
            return Ok(Vec::new());
        }
    };

    let mut expenses = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Expense>(item) {
            Ok(expense) => expenses.push(expense),
            Err(err) => push_warning(warnings, format!("dropping expense #{}: {}", index, err)),
        }
    }
    Ok(expenses)
}

pub fn save_expenses(store: &dyn KeyValueStore, expenses: &[Expense]) -> Result<()> {
    let json = serde_json::to_string(expenses)
        .map_err(|err| TrackerError::Storage(format!("serializing expenses: {}", err)))?;
    store.set(StorageKeys::EXPENSES, &json)
}

fn write_records(store: &dyn KeyValueStore, records: &[BudgetRecord]) -> Result<()> {
    let json = serde_json::to_string(records)
        .map_err(|err| TrackerError::Storage(format!("serializing budgets: {}", err)))?;
    store.set(StorageKeys::BUDGETS_V2, &json)
}

/// Keeps records that deserialize and validate, and the first record for each
/// `(category, month)` pair. Ids are rewritten to `<category>-<YYYY-MM>`.
fn parse_records(items: Vec<Value>, warnings: &mut Vec<String>) -> Vec<BudgetRecord> {
    let mut seen: HashSet<(String, Month)> = HashSet::new();
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let mut record = match serde_json::from_value::<BudgetRecord>(item) {
            Ok(record) => record,
            Err(err) => {
                push_warning(warnings, format!("dropping budget #{}: {}", index, err));
                continue;
            }
        };
        if let Err(err) = record.validate() {
            push_warning(warnings, format!("dropping budget `{}`: {}", record.id, err));
            continue;
        }
        let expected = record_id(&record.category_id, &record.month);
        if record.id != expected {
            push_warning(
                warnings,
                format!("repairing budget id `{}` -> `{}`", record.id, expected),
            );
            record.id = expected;
        }
        if !seen.insert((record.category_id.clone(), record.month)) {
            push_warning(
                warnings,
                format!("dropping duplicate budget `{}`", record.id),
            );
            continue;
        }
        records.push(record);
    }
    records
}

fn discard(store: &dyn KeyValueStore, key: &str, reason: &str, warnings: &mut Vec<String>) {
    push_warning(warnings, format!("discarding corrupt `{}`: {}", key, reason));
    if let Err(err) = store.remove(key) {
        push_warning(warnings, format!("removing corrupt `{}` failed: {}", key, err));
    }
}

fn push_warning(warnings: &mut Vec<String>, message: String) {
    warn!("{}", message);
    warnings.push(message);
}
