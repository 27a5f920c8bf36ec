//! Directory-backed fallback [`KeyValueStore`].
//!
//! Used when the persistent database is unavailable or unwanted. Each key
//! is one file under the store directory holding the value's JSON text.
//!
//! This backend never fails the caller. A failed read is logged and
//! reported as an absent key; a failed write or delete is logged and
//! otherwise ignored. A file whose contents do not parse as JSON reads as
//! absent too.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use snippet_collector_core::store::KeyValueStore;

pub struct FallbackStore {
    dir: PathBuf,
}

/// File name for `key`: ASCII alphanumerics, `-`, and `_` pass through;
/// every other byte is written as `%XX`.
fn file_name_for(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 5);
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            name.push(b as char);
        } else {
            name.push_str(&format!("%{:02X}", b));
        }
    }
    name.push_str(".json");
    name
}

impl FallbackStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name_for(key))
    }

    async fn read_key(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read from fallback store");
                return None;
            }
        };
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unparsable value in fallback store");
                None
            }
        }
    }

    async fn write_key(&self, key: &str, value: &Value) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let text = serde_json::to_string(value)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &path).await
    }

    async fn remove_key(&self, key: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[async_trait]
impl KeyValueStore for FallbackStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let mut found = Map::new();
        for key in keys {
            if let Some(value) = self.read_key(key).await {
                found.insert((*key).to_string(), value);
            }
        }
        Ok(found)
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        for (key, value) in &items {
            if value.is_null() {
                if let Err(e) = self.remove_key(key).await {
                    tracing::warn!(key = %key, error = %e, "failed to remove from fallback store");
                }
                continue;
            }
            if let Err(e) = self.write_key(key, value).await {
                tracing::warn!(key = %key, error = %e, "failed to write to fallback store");
            }
        }
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            if let Err(e) = self.remove_key(key).await {
                tracing::warn!(key, error = %e, "failed to remove from fallback store");
            }
        }
        Ok(())
    }
}
