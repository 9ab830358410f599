use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::{Result, TrackerError};

use super::KeyValueStore;

/// In-process store. An optional byte quota makes oversized writes fail the
/// way a browser profile's storage would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Seeds the store with raw entries, bypassing the quota.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            entries: RwLock::new(map),
            quota_bytes: None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn used_bytes(&self) -> usize {
        self.read()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.write();
        if let Some(quota) = self.quota_bytes {
            let existing = entries
                .get(key)
                .map(|current| key.len() + current.len())
                .unwrap_or(0);
            let used: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
            let projected = used - existing + key.len() + value.len();
            if projected > quota {
                return Err(TrackerError::Storage(format!(
                    "quota exceeded writing `{}` ({} of {} bytes)",
                    key, projected, quota
                )));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("budgets_v2").unwrap(), None);
        store.set("budgets_v2", "[]").unwrap();
        assert_eq!(store.get("budgets_v2").unwrap().as_deref(), Some("[]"));
        store.remove("budgets_v2").unwrap();
        store.remove("budgets_v2").unwrap();
        assert!(!store.contains("budgets_v2"));
    }

    #[test]
    fn quota_rejects_oversized_writes_and_keeps_old_value() {
        let store = MemoryStore::with_quota(16);
        store.set("k", "small").unwrap();
        let err = store.set("k", "this value is far too large").unwrap_err();
        assert!(matches!(err, TrackerError::Storage(ref message) if message.contains("quota")));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
        assert_eq!(store.used_bytes(), 6);
    }
}
