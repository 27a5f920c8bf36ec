//! Backend selection.
//!
//! The store is chosen once from `[storage]` in the config and handed to
//! the settings manager and collection engine as a trait object.

use std::sync::Arc;

use anyhow::Result;

use snippet_collector_core::collection::SnippetCollection;
use snippet_collector_core::store::memory::InMemoryStore;
use snippet_collector_core::store::KeyValueStore;

use crate::config::{Config, StorageBackend};
use crate::fallback_store::FallbackStore;
use crate::sqlite_store::SqliteStore;

/// Open the configured backend.
pub async fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    let path = &config.storage.path;
    let store: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStore::open(path).await?),
        StorageBackend::Fallback => Arc::new(FallbackStore::new(path)),
        StorageBackend::Memory => Arc::new(InMemoryStore::new()),
    };
    tracing::debug!(backend = ?config.storage.backend, path = %path.display(), "opened store");
    Ok(store)
}

/// Open the configured backend and wrap it in a [`SnippetCollection`].
pub async fn open_collection(config: &Config) -> Result<SnippetCollection> {
    Ok(SnippetCollection::new(open_store(config).await?))
}
