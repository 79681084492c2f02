//! In-memory key-value storage
//!
//! Keys are field tuples (a single-field key is a one-element tuple); each key
//! maps to a set of values. One lock guards the whole map.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};

/// Thread-safe multi-value map
#[derive(Debug, Default)]
pub struct KvStore {
    db: Mutex<HashMap<Vec<String>, BTreeSet<String>>>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `value` with `key`
    pub fn store(&self, key: Vec<String>, value: String) {
        let mut db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        db.entry(key).or_default().insert(value);
    }

    /// Values associated with `key`, sorted; empty when the key is unknown
    pub fn retrieve(&self, key: &[String]) -> Vec<String> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        db.get(key)
            .map(|values| values.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove `value` from every key; returns how many keys held it
    pub fn delete(&self, value: &str) -> usize {
        let mut db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        db.values_mut()
            .map(|values| values.remove(value))
            .filter(|removed| *removed)
            .count()
    }
}
