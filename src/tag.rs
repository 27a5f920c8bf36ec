//! `scc tag` and `scc tags`: edit a snippet's tags and list the tags in use.

use anyhow::{bail, Result};

use snippet_collector_core::snippet::parse_tag_list;

use crate::config::Config;
use crate::storage;

/// Replace the tags of `id` with the comma-separated `tags`.
///
/// An empty list clears the tags. The snippet moves to the front of the
/// collection.
pub async fn run_tag(config: &Config, id: &str, tags: &str) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    match collection.set_snippet_tags(id, parse_tag_list(tags)).await? {
        Some(snippet) if snippet.tags.is_empty() => println!("Cleared tags on {}.", snippet.id),
        Some(snippet) => println!("Tagged {}: {}", snippet.id, snippet.tags.join(", ")),
        None => bail!("snippet not found: {}", id),
    }
    Ok(())
}

/// Print every distinct tag, one per line.
pub async fn run_tags(config: &Config) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    for tag in collection.list_tags().await? {
        println!("{}", tag);
    }
    Ok(())
}
