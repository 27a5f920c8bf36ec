//! In-memory [`KeyValueStore`] implementation for testing and embedding.
//!
//! Uses a `HashMap` behind `std::sync::RwLock`. Values are cloned in and
//! out, so callers never share state with the store.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

use super::KeyValueStore;

/// In-memory store for tests and hosts without persistent storage.
pub struct InMemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` currently has a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values
            .read()
            .map(|v| v.contains_key(key))
            .unwrap_or(false)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let values = self.values.read().map_err(poisoned)?;
        let mut found = Map::new();
        for key in keys {
            if let Some(value) = values.get(*key) {
                found.insert((*key).to_string(), value.clone());
            }
        }
        Ok(found)
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        for (key, value) in items {
            values.insert(key, value);
        }
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}
