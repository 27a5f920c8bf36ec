//! # Snippet Collector Core
//!
//! Runtime-agnostic logic for Snippet Collector: the snippet model and
//! normalizer, user settings, the key-value store abstraction, the
//! collection engine, and the exporters.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Persistence goes
//! through [`store::KeyValueStore`], which the host selects once and
//! injects into [`collection::SnippetCollection`].
//!
//! ```rust
//! use std::sync::Arc;
//! use snippet_collector_core::collection::SnippetCollection;
//! use snippet_collector_core::snippet::RawSnippet;
//! use snippet_collector_core::store::memory::InMemoryStore;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let snippets = SnippetCollection::new(Arc::new(InMemoryStore::new()));
//! snippets.add_snippet(RawSnippet::with_code("print(1)").id("a"), None).await?;
//! snippets.add_snippet(RawSnippet::with_code("print(1)").id("b"), None).await?;
//! assert_eq!(snippets.get_snippets().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod clipboard;
pub mod collection;
pub mod export;
pub mod language;
pub mod sanitize;
pub mod settings;
pub mod snippet;
pub mod store;
