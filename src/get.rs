//! Snippet retrieval by ID.
//!
//! Used by `scc get` (full record) and `scc copy` (clipboard text).

use anyhow::{bail, Result};

use snippet_collector_core::clipboard::build_clipboard_payload;
use snippet_collector_core::collection::SnippetCollection;
use snippet_collector_core::snippet::Snippet;

use crate::config::Config;
use crate::storage;

async fn find(collection: &SnippetCollection, id: &str) -> Result<Snippet> {
    match collection.get_snippet(id).await? {
        Some(snippet) => Ok(snippet),
        None => bail!("snippet not found: {}", id),
    }
}

/// CLI entry point. Prints the full snippet record.
pub async fn run_get(config: &Config, id: &str, json: bool) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    let snippet = find(&collection, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snippet)?);
        return Ok(());
    }

    println!("--- Snippet ---");
    println!("id:         {}", snippet.id);
    println!(
        "title:      {}",
        if snippet.page_title.is_empty() {
            "(untitled)"
        } else {
            snippet.page_title.as_str()
        }
    );
    if !snippet.source_url.is_empty() {
        println!("source_url: {}", snippet.source_url);
    }
    println!("language:   {}", snippet.language);
    println!("tags:       {}", snippet.tags.join(", "));
    println!("created_at: {}", format_ts_iso(snippet.created_at));
    println!("hash:       {}", snippet.hash);
    println!();

    println!("--- Code ---");
    println!("{}", snippet.code);

    Ok(())
}

/// CLI entry point. Prints what would be placed on the clipboard.
pub async fn run_copy(config: &Config, id: &str) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    let snippet = find(&collection, id).await?;
    let settings = collection.settings().load_settings().await?;
    println!("{}", build_clipboard_payload(&snippet, &settings));
    Ok(())
}

fn format_ts_iso(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ms.to_string())
}
