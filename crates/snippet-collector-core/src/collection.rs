//! The snippet collection engine.
//!
//! The whole collection lives under [`SNIPPETS_KEY`] as one JSON array,
//! newest first. Every mutation is load → modify → persist the full array.
//!
//! # Invariants
//!
//! - No two records share an `id`.
//! - No two records share a `hash`. Re-adding the same code replaces the
//!   older record instead of appending a second one.
//! - After every [`add_snippet`](SnippetCollection::add_snippet) the length
//!   is at most the effective history cap.
//!
//! # Concurrency
//!
//! There is no lock around the read-modify-write sequence. Two writers
//! racing on the same store may lose one update; the last `set` wins.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use crate::settings::SettingsManager;
use crate::snippet::{hash_code, normalize_snippet, RawSnippet, Snippet};
use crate::store::{KeyValueStore, SNIPPETS_KEY};

/// Add, read, delete, and search the persisted snippet collection.
#[derive(Clone)]
pub struct SnippetCollection {
    store: Arc<dyn KeyValueStore>,
    settings: SettingsManager,
}

/// Id given on read to a stored record that has none.
///
/// Derived from the content hash so that it is the same on every read and
/// can be passed back to [`SnippetCollection::delete_snippet`].
fn legacy_id(raw: &RawSnippet) -> String {
    let hash = match raw.hash.as_deref().filter(|h| !h.is_empty()) {
        Some(hash) => hash.to_string(),
        None => hash_code(raw.code.as_deref().unwrap_or_default()),
    };
    format!("legacy-{}", hash)
}

/// Parse the stored collection, normalizing every record.
///
/// A value that is not an array reads as an empty collection. Elements
/// that are not objects cannot be records and are skipped. Records without
/// an id get a stable [`legacy_id`].
fn parse_collection(value: Option<Value>) -> Vec<Snippet> {
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| {
            if !item.is_object() {
                tracing::warn!("skipping stored snippet that is not an object");
                return None;
            }
            match serde_json::from_value::<RawSnippet>(item) {
                Ok(mut raw) => {
                    if raw.present_id().is_none() {
                        raw.id = Some(legacy_id(&raw));
                    }
                    Some(normalize_snippet(raw))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable stored snippet");
                    None
                }
            }
        })
        .collect()
}

fn matches_query(snippet: &Snippet, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let fields = [
        &snippet.code,
        &snippet.page_title,
        &snippet.source_url,
        &snippet.language,
    ];
    fields
        .iter()
        .any(|value| !value.is_empty() && value.to_lowercase().contains(query))
        || snippet
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
}

fn has_all_tags(snippet: &Snippet, requested: &[String]) -> bool {
    if requested.is_empty() {
        return true;
    }
    let own: Vec<String> = snippet.tags.iter().map(|t| t.to_lowercase()).collect();
    requested.iter().all(|tag| own.contains(tag))
}

impl SnippetCollection {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let settings = SettingsManager::new(store.clone());
        Self { store, settings }
    }

    /// The settings manager sharing this collection's store.
    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    async fn persist(&self, snippets: &[Snippet]) -> Result<()> {
        self.store
            .set_value(SNIPPETS_KEY, serde_json::to_value(snippets)?)
            .await
    }

    /// Insert `raw` at the front of the collection.
    ///
    /// Returns `None` without touching the store when `raw` has no id.
    /// Any existing record with the same id or the same content hash is
    /// removed first. The collection is then truncated from the tail to
    /// the effective cap: `max_history_override` if positive, else the
    /// payload's own `max_history` if positive, else the `maxHistory`
    /// setting.
    pub async fn add_snippet(
        &self,
        raw: RawSnippet,
        max_history_override: Option<i64>,
    ) -> Result<Option<Snippet>> {
        if raw.present_id().is_none() {
            tracing::debug!("ignoring snippet without id");
            return Ok(None);
        }
        let override_cap = max_history_override
            .filter(|n| *n > 0)
            .or(raw.max_history.filter(|n| *n > 0));

        let normalized = normalize_snippet(raw);
        let mut snippets = self.get_snippets().await?;
        let before = snippets.len();
        snippets.retain(|s| s.id != normalized.id && s.hash != normalized.hash);
        if snippets.len() != before {
            tracing::debug!(
                id = %normalized.id,
                replaced = before - snippets.len(),
                "replacing snippet with same id or content"
            );
        }
        snippets.insert(0, normalized.clone());

        let limit = match override_cap {
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            None => self.settings.load_settings().await?.max_history,
        };
        if snippets.len() > limit {
            tracing::debug!(
                evicted = snippets.len() - limit,
                limit,
                "evicting oldest snippets"
            );
            snippets.truncate(limit);
        }

        self.persist(&snippets).await?;
        Ok(Some(normalized))
    }

    /// The full collection, newest first, normalized on read.
    pub async fn get_snippets(&self) -> Result<Vec<Snippet>> {
        let stored = self.store.get_value(SNIPPETS_KEY).await?;
        Ok(parse_collection(stored))
    }

    /// Look up a single snippet by id.
    pub async fn get_snippet(&self, id: &str) -> Result<Option<Snippet>> {
        if id.is_empty() {
            return Ok(None);
        }
        Ok(self
            .get_snippets()
            .await?
            .into_iter()
            .find(|s| s.id == id))
    }

    /// Remove the snippet with `id`. Empty ids are ignored.
    ///
    /// Deleting the last snippet removes the storage key instead of
    /// persisting an empty array.
    pub async fn delete_snippet(&self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Ok(());
        }
        let mut snippets = self.get_snippets().await?;
        snippets.retain(|s| s.id != id);
        if snippets.is_empty() {
            self.store.remove(&[SNIPPETS_KEY]).await
        } else {
            self.persist(&snippets).await
        }
    }

    /// Remove every snippet.
    pub async fn clear_snippets(&self) -> Result<()> {
        self.store.remove(&[SNIPPETS_KEY]).await
    }

    /// Replace the tags of the snippet with `id`.
    ///
    /// The whole record is re-added with the new tags, so it moves to the
    /// front and keeps its hash and creation time. Returns `None` when no
    /// snippet has that id.
    pub async fn set_snippet_tags(&self, id: &str, tags: Vec<String>) -> Result<Option<Snippet>> {
        let Some(existing) = self.get_snippet(id).await? else {
            return Ok(None);
        };
        let mut raw = RawSnippet::from(existing);
        raw.tags = tags;
        self.add_snippet(raw, None).await
    }

    /// Every distinct tag in the collection, sorted.
    pub async fn list_tags(&self) -> Result<Vec<String>> {
        let tags: BTreeSet<String> = self
            .get_snippets()
            .await?
            .into_iter()
            .flat_map(|s| s.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Case-insensitive search.
    ///
    /// A snippet matches when the trimmed query is empty or is a substring
    /// of its code, page title, source URL, language, or any tag, AND it
    /// carries every requested tag. Stored order is preserved.
    pub async fn search_snippets(&self, query: &str, tags: &[String]) -> Result<Vec<Snippet>> {
        let query = query.trim().to_lowercase();
        let requested: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
        Ok(self
            .get_snippets()
            .await?
            .into_iter()
            .filter(|s| matches_query(s, &query) && has_all_tags(s, &requested))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsPatch;
    use crate::store::memory::InMemoryStore;
    use serde_json::json;

    fn collection() -> (Arc<InMemoryStore>, SnippetCollection) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), SnippetCollection::new(store))
    }

    fn raw(id: &str, code: &str) -> RawSnippet {
        RawSnippet::with_code(code).id(id)
    }

    fn ids(snippets: &[Snippet]) -> Vec<&str> {
        snippets.iter().map(|s| s.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_without_id_is_noop() {
        let (store, c) = collection();
        let added = c.add_snippet(RawSnippet::with_code("x"), None).await.unwrap();
        assert!(added.is_none());
        let added = c.add_snippet(raw("", "x"), None).await.unwrap();
        assert!(added.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_add_then_get_round_trip() {
        let (_store, c) = collection();
        let input = RawSnippet {
            id: Some("a".into()),
            code: Some("SELECT 1;".into()),
            language: Some("sql".into()),
            tags: vec![" db ".into(), "".into(), "query".into()],
            ..Default::default()
        };
        let added = c.add_snippet(input, None).await.unwrap().unwrap();
        let all = c.get_snippets().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], added);
        assert_eq!(all[0].code, "SELECT 1;");
        assert_eq!(all[0].language, "sql");
        assert_eq!(all[0].tags, vec!["db", "query"]);
    }

    #[tokio::test]
    async fn test_same_code_deduplicates_latest_wins() {
        let (_store, c) = collection();
        c.add_snippet(raw("a", "print(1)"), None).await.unwrap();
        c.add_snippet(raw("b", "print(1)"), None).await.unwrap();
        let all = c.get_snippets().await.unwrap();
        assert_eq!(ids(&all), vec!["b"]);

        c.add_snippet(raw("a", "print(1)"), None).await.unwrap();
        assert_eq!(ids(&c.get_snippets().await.unwrap()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_same_id_replaces_and_moves_to_front() {
        let (_store, c) = collection();
        c.add_snippet(raw("a", "one"), None).await.unwrap();
        c.add_snippet(raw("b", "two"), None).await.unwrap();
        c.add_snippet(raw("a", "one, edited"), None).await.unwrap();
        let all = c.get_snippets().await.unwrap();
        assert_eq!(ids(&all), vec!["a", "b"]);
        assert_eq!(all[0].code, "one, edited");
    }

    #[tokio::test]
    async fn test_cap_evicts_oldest_by_position() {
        let (_store, c) = collection();
        c.settings()
            .save_settings(&SettingsPatch {
                max_history: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        for (id, code) in [("1", "a"), ("2", "b"), ("3", "c")] {
            c.add_snippet(raw(id, code), None).await.unwrap();
        }
        assert_eq!(ids(&c.get_snippets().await.unwrap()), vec!["3", "2"]);
    }

    #[tokio::test]
    async fn test_override_cap_wins_over_setting() {
        let (_store, c) = collection();
        for (id, code) in [("1", "a"), ("2", "b"), ("3", "c"), ("4", "d")] {
            c.add_snippet(raw(id, code), None).await.unwrap();
        }
        c.add_snippet(raw("5", "e"), Some(3)).await.unwrap();
        assert_eq!(ids(&c.get_snippets().await.unwrap()), vec!["5", "4", "3"]);
    }

    #[tokio::test]
    async fn test_non_positive_override_falls_back_to_setting() {
        let (_store, c) = collection();
        for (id, code) in [("1", "a"), ("2", "b"), ("3", "c")] {
            c.add_snippet(raw(id, code), Some(0)).await.unwrap();
        }
        c.add_snippet(raw("4", "d"), Some(-1)).await.unwrap();
        assert_eq!(c.get_snippets().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_payload_max_history_is_honoured() {
        let (_store, c) = collection();
        c.add_snippet(raw("1", "a"), None).await.unwrap();
        c.add_snippet(raw("2", "b"), None).await.unwrap();
        let mut payload = raw("3", "c");
        payload.max_history = Some(1);
        c.add_snippet(payload, None).await.unwrap();
        assert_eq!(ids(&c.get_snippets().await.unwrap()), vec!["3"]);
    }

    #[tokio::test]
    async fn test_length_and_unique_ids_hold_after_many_adds() {
        let (_store, c) = collection();
        for i in 0..40 {
            let id = format!("id-{}", i % 7);
            let code = format!("code {}", i % 11);
            c.add_snippet(raw(&id, &code), Some(5)).await.unwrap();
            let all = c.get_snippets().await.unwrap();
            assert!(all.len() <= 5);
            let mut seen_ids: Vec<&str> = ids(&all);
            seen_ids.sort();
            seen_ids.dedup();
            assert_eq!(seen_ids.len(), all.len());
            let mut hashes: Vec<&str> = all.iter().map(|s| s.hash.as_str()).collect();
            hashes.sort();
            hashes.dedup();
            assert_eq!(hashes.len(), all.len());
        }
    }

    #[tokio::test]
    async fn test_get_snippets_backfills_legacy_records() {
        let (store, c) = collection();
        store
            .set_value(
                SNIPPETS_KEY,
                json!([
                    { "id": "old", "code": "x = 1" },
                    { "id": "tagged", "code": "y", "tags": "not-a-list", "createdAt": 5 },
                    "garbage"
                ]),
            )
            .await
            .unwrap();
        let all = c.get_snippets().await.unwrap();
        assert_eq!(ids(&all), vec!["old", "tagged"]);
        assert_eq!(all[0].hash, crate::snippet::hash_code("x = 1"));
        assert!(all[0].created_at > 0);
        assert!(all[1].tags.is_empty());
        assert_eq!(all[1].created_at, 5);
    }

    #[tokio::test]
    async fn test_non_array_collection_reads_empty() {
        let (store, c) = collection();
        store
            .set_value(SNIPPETS_KEY, json!({ "oops": true }))
            .await
            .unwrap();
        assert!(c.get_snippets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_snippet_by_id() {
        let (_store, c) = collection();
        c.add_snippet(raw("a", "x"), None).await.unwrap();
        assert_eq!(c.get_snippet("a").await.unwrap().unwrap().code, "x");
        assert!(c.get_snippet("b").await.unwrap().is_none());
        assert!(c.get_snippet("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent_and_removes_key_when_empty() {
        let (store, c) = collection();
        c.add_snippet(raw("a", "x"), None).await.unwrap();
        c.add_snippet(raw("b", "y"), None).await.unwrap();

        c.delete_snippet("a").await.unwrap();
        c.delete_snippet("a").await.unwrap();
        assert_eq!(ids(&c.get_snippets().await.unwrap()), vec!["b"]);

        c.delete_snippet("b").await.unwrap();
        assert!(!store.contains_key(SNIPPETS_KEY));
        c.delete_snippet("b").await.unwrap();
        assert!(c.get_snippets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_empty_id_is_noop() {
        let (_store, c) = collection();
        c.add_snippet(raw("a", "x"), None).await.unwrap();
        c.delete_snippet("").await.unwrap();
        assert_eq!(c.get_snippets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let (store, c) = collection();
        c.add_snippet(raw("a", "x"), None).await.unwrap();
        c.clear_snippets().await.unwrap();
        assert!(!store.contains_key(SNIPPETS_KEY));
    }

    async fn seeded() -> SnippetCollection {
        let (_store, c) = collection();
        let items = [
            RawSnippet {
                id: Some("py-web".into()),
                code: Some("from flask import Flask".into()),
                page_title: Some("Flask Quickstart".into()),
                source_url: Some("https://flask.example/start".into()),
                language: Some("python".into()),
                tags: vec!["Python".into(), "web".into()],
                ..Default::default()
            },
            RawSnippet {
                id: Some("py".into()),
                code: Some("print('hi')".into()),
                language: Some("python".into()),
                tags: vec!["python".into()],
                ..Default::default()
            },
            RawSnippet {
                id: Some("rs".into()),
                code: Some("fn main() {}".into()),
                page_title: Some("Rust by Example".into()),
                language: Some("rust".into()),
                tags: vec!["systems".into()],
                ..Default::default()
            },
        ];
        for item in items {
            c.add_snippet(item, None).await.unwrap();
        }
        c
    }

    #[tokio::test]
    async fn test_search_empty_returns_all_in_order() {
        let c = seeded().await;
        let found = c.search_snippets("", &[]).await.unwrap();
        assert_eq!(ids(&found), vec!["rs", "py", "py-web"]);
        let found = c.search_snippets("   ", &[]).await.unwrap();
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_search_query_fields_case_insensitive() {
        let c = seeded().await;
        assert_eq!(ids(&c.search_snippets("FLASK", &[]).await.unwrap()), vec!["py-web"]);
        assert_eq!(ids(&c.search_snippets("example", &[]).await.unwrap()), vec!["rs", "py-web"]);
        assert_eq!(ids(&c.search_snippets("RUST", &[]).await.unwrap()), vec!["rs"]);
        assert_eq!(ids(&c.search_snippets("syst", &[]).await.unwrap()), vec!["rs"]);
        assert!(c.search_snippets("nothing-here", &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_tags_are_and_filtered() {
        let c = seeded().await;
        let both = vec!["python".to_string(), "WEB".to_string()];
        assert_eq!(ids(&c.search_snippets("", &both).await.unwrap()), vec!["py-web"]);
        let one = vec!["python".to_string()];
        assert_eq!(ids(&c.search_snippets("", &one).await.unwrap()), vec!["py", "py-web"]);
    }

    #[tokio::test]
    async fn test_search_query_and_tags_combined() {
        let c = seeded().await;
        let tags = vec!["python".to_string()];
        assert_eq!(ids(&c.search_snippets("print", &tags).await.unwrap()), vec!["py"]);
        assert!(c.search_snippets("fn main", &tags).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_record_without_id_has_stable_id() {
        let (store, c) = collection();
        store
            .set_value(
                SNIPPETS_KEY,
                json!([{ "code": "legacy" }, { "id": "k", "code": "keep" }]),
            )
            .await
            .unwrap();

        let first = c.get_snippets().await.unwrap();
        let second = c.get_snippets().await.unwrap();
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[0].id, format!("legacy-{}", crate::snippet::hash_code("legacy")));

        c.delete_snippet(&first[0].id).await.unwrap();
        let left = c.get_snippets().await.unwrap();
        assert_eq!(ids(&left), vec!["k"]);
    }

    #[tokio::test]
    async fn test_set_tags_reinserts_record_at_front() {
        let (_store, c) = collection();
        c.add_snippet(raw("a", "x()").tags(["old"]), None).await.unwrap();
        c.add_snippet(raw("b", "y()"), None).await.unwrap();
        let before = c.get_snippet("a").await.unwrap().unwrap();

        let updated = c
            .set_snippet_tags("a", vec!["new".into(), " spaced ".into(), "".into()])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.tags, vec!["new", "spaced"]);

        let all = c.get_snippets().await.unwrap();
        assert_eq!(ids(&all), vec!["a", "b"]);
        assert_eq!(all[0].hash, before.hash);
        assert_eq!(all[0].created_at, before.created_at);
        assert_eq!(all[0].tags, vec!["new", "spaced"]);
    }

    #[tokio::test]
    async fn test_set_tags_unknown_id_is_none() {
        let (store, c) = collection();
        assert!(c.set_snippet_tags("nope", vec!["t".into()]).await.unwrap().is_none());
        assert!(!store.contains_key(SNIPPETS_KEY));
    }

    #[tokio::test]
    async fn test_list_tags_distinct_and_sorted() {
        let (_store, c) = collection();
        c.add_snippet(raw("a", "1").tags(["web", "python"]), None).await.unwrap();
        c.add_snippet(raw("b", "2").tags(["python", "cli"]), None).await.unwrap();
        assert_eq!(c.list_tags().await.unwrap(), vec!["cli", "python", "web"]);
    }
}
