//! Storage abstraction for Snippet Collector.
//!
//! The [`KeyValueStore`] trait is the only persistence capability the
//! settings manager and the collection engine need: read, write, and
//! remove opaque JSON values under string keys, asynchronously.
//!
//! Backends are interchangeable and selected once at startup. The core
//! crate ships [`memory::InMemoryStore`]; the native crate adds a
//! SQLite-backed persistent store and a directory-backed fallback store.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Storage key holding the [`Settings`](crate::settings::Settings) record.
pub const SETTINGS_KEY: &str = "cccSettings";

/// Storage key holding the snippet collection (JSON array, newest first).
pub const SNIPPETS_KEY: &str = "cccSnippets";

/// Abstract key-value backend.
///
/// There is no compare-and-swap: every `set` replaces the whole value
/// under each key, so a concurrent read-modify-write from two callers is
/// last-writer-wins.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get`](KeyValueStore::get) | Fetch the values present for the given keys |
/// | [`set`](KeyValueStore::set) | Write every key/value pair of the mapping |
/// | [`remove`](KeyValueStore::remove) | Delete the given keys |
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch values for `keys`. Missing keys are absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Write every entry of `items`, replacing existing values.
    async fn set(&self, items: Map<String, Value>) -> Result<()>;

    /// Delete `keys`. Removing an absent key is not an error.
    async fn remove(&self, keys: &[&str]) -> Result<()>;

    /// Fetch a single value.
    async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let mut found = self.get(&[key]).await?;
        Ok(found.remove(key))
    }

    /// Write a single value.
    async fn set_value(&self, key: &str, value: Value) -> Result<()> {
        let mut items = Map::new();
        items.insert(key.to_string(), value);
        self.set(items).await
    }
}
