//! Listing and searching saved snippets from the CLI.

use anyhow::Result;

use snippet_collector_core::snippet::Snippet;

use crate::config::Config;
use crate::storage;

const EXCERPT_CHARS: usize = 120;

fn excerpt(code: &str) -> String {
    let flat = code.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > EXCERPT_CHARS {
        let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}

fn format_date(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Print snippets in the human-readable list layout, or as JSON.
pub fn print_snippets(snippets: &[Snippet], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snippets)?);
        return Ok(());
    }
    if snippets.is_empty() {
        println!("No snippets.");
        return Ok(());
    }
    for (i, snippet) in snippets.iter().enumerate() {
        let title = if snippet.page_title.is_empty() {
            "(untitled)"
        } else {
            snippet.page_title.as_str()
        };
        let language = if snippet.language.is_empty() {
            "?"
        } else {
            snippet.language.as_str()
        };
        println!("{}. [{}] {}", i + 1, language, title);
        println!("    created: {}", format_date(snippet.created_at));
        if !snippet.source_url.is_empty() {
            println!("    url: {}", snippet.source_url);
        }
        if !snippet.tags.is_empty() {
            println!("    tags: {}", snippet.tags.join(", "));
        }
        println!("    code: \"{}\"", excerpt(&snippet.code));
        println!("    id: {}", snippet.id);
        println!();
    }
    Ok(())
}

pub async fn run_list(config: &Config, json: bool) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    let snippets = collection.get_snippets().await?;
    print_snippets(&snippets, json)
}

pub async fn run_search(config: &Config, query: &str, tags: &[String], json: bool) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    let snippets = collection.search_snippets(query, tags).await?;
    tracing::debug!(query, tags = ?tags, hits = snippets.len(), "search finished");
    if snippets.is_empty() && !json {
        println!("No results.");
        return Ok(());
    }
    print_snippets(&snippets, json)
}
