#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use expense_tracker_core::{
    domain::{BudgetRecord, Month},
    errors::{Result, TrackerError},
    storage::{KeyValueStore, MemoryStore},
    ExpenseTracker, FixedClock,
};

/// Store handle that can be kept by a test after a clone is handed to a tracker.
#[derive(Clone, Default)]
pub struct SharedStore(pub Arc<MemoryStore>);

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(entries: &[(&str, &str)]) -> Self {
        Self(Arc::new(MemoryStore::with_entries(entries.iter().copied())))
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.0.get(key).expect("memory store read")
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.0.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.0.remove(key)
    }
}

/// Wraps a shared store so the first read of each listed key fails.
pub struct FlakyStore {
    inner: SharedStore,
    failing: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn failing_first_read(inner: &SharedStore, keys: &[&str]) -> Self {
        Self {
            inner: inner.clone(),
            failing: Mutex::new(keys.iter().map(|key| key.to_string()).collect()),
        }
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.failing.lock().unwrap().remove(key) {
            return Err(TrackerError::Storage(format!("reading `{}` timed out", key)));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

/// Opens a tracker over `store` with a clock fixed at noon on the given date.
pub fn open_tracker(store: &SharedStore, year: i32, month: u32, day: u32) -> (ExpenseTracker, FixedClock) {
    let clock = FixedClock::at_date(year, month, day);
    let tracker = ExpenseTracker::open(Box::new(store.clone()), Box::new(clock.clone()));
    (tracker, clock)
}

pub fn month(value: &str) -> Month {
    value.parse().expect("valid month literal")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date literal")
}

pub fn budget(category: &str, value: &str, amount: f64, rollover: bool) -> BudgetRecord {
    let mut record = BudgetRecord::new(category, month(value), amount, Utc::now());
    record.rollover = rollover;
    record
}

pub fn spend(category: &str, on: NaiveDate, amount: f64) -> (String, NaiveDate, f64) {
    (category.to_string(), on, amount)
}
