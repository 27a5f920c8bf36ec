//! Saving captured code.
//!
//! This is the path a capture takes from the outside world into the
//! collection: sanitize the copied text with the user's settings, tag it
//! with a language, and hand the payload to
//! [`SnippetCollection::add_snippet`].

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::PathBuf;
use uuid::Uuid;

use snippet_collector_core::collection::SnippetCollection;
use snippet_collector_core::language::detect_language;
use snippet_collector_core::sanitize::sanitize_code;
use snippet_collector_core::settings::Settings;
use snippet_collector_core::snippet::{RawSnippet, Snippet};

use crate::config::Config;
use crate::storage;

/// What the capture layer knows about a piece of copied code.
#[derive(Debug, Clone, Default)]
pub struct Capture {
    pub code: String,
    pub id: Option<String>,
    pub source_url: Option<String>,
    pub page_title: Option<String>,
    pub language: Option<String>,
    /// `class` attributes of the captured element and its ancestors,
    /// innermost first.
    pub class_names: Vec<String>,
    pub tags: Vec<String>,
    /// Keep the text exactly as captured.
    pub raw: bool,
}

/// Turn a capture into the payload the collection engine accepts.
///
/// A missing id is filled with a fresh UUID so that the capture is not
/// dropped by the engine's "no id, no add" rule.
pub fn prepare_snippet(capture: Capture, settings: &Settings) -> RawSnippet {
    let code = if capture.raw {
        capture.code
    } else {
        sanitize_code(&capture.code, &settings.sanitize)
    };
    let language = capture
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| detect_language(capture.class_names.as_slice(), &code));
    let id = capture
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    RawSnippet {
        id: Some(id),
        code: Some(code),
        source_url: capture.source_url,
        page_title: capture.page_title,
        language: Some(language),
        tags: capture.tags,
        ..Default::default()
    }
}

/// Save `capture` unless saving is disabled in settings.
pub async fn save_capture(
    collection: &SnippetCollection,
    capture: Capture,
    max_history: Option<i64>,
) -> Result<Option<Snippet>> {
    let settings = collection.settings().load_settings().await?;
    if !settings.saving_enabled {
        tracing::info!("snippet saving is disabled in settings");
        return Ok(None);
    }
    let payload = prepare_snippet(capture, &settings);
    collection.add_snippet(payload, max_history).await
}

/// Read the code from `--code`, `--file`, or stdin, in that order.
pub fn read_code(code: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(code) = code {
        return Ok(code);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read code file: {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read code from stdin")?;
    Ok(buf)
}

/// CLI entry point for `scc add`.
pub async fn run_add(config: &Config, capture: Capture, max_history: Option<i64>) -> Result<()> {
    if capture.code.trim().is_empty() {
        bail!("nothing to save: code is empty");
    }
    let collection = storage::open_collection(config).await?;
    match save_capture(&collection, capture, max_history).await? {
        Some(snippet) => {
            println!("{}", snippet.id);
        }
        None => {
            eprintln!("Snippet not saved: saving is disabled (scc settings set '{{\"savingEnabled\": true}}').");
        }
    }
    Ok(())
}

/// Delete the snippet with `id`. Returns whether one existed.
pub async fn delete_existing(collection: &SnippetCollection, id: &str) -> Result<bool> {
    if collection.get_snippet(id).await?.is_none() {
        return Ok(false);
    }
    collection.delete_snippet(id).await?;
    Ok(true)
}

pub async fn run_delete(config: &Config, id: &str) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    if delete_existing(&collection, id).await? {
        println!("Deleted {}.", id);
    } else {
        println!("No snippet with id {}.", id);
    }
    Ok(())
}

pub async fn run_clear(config: &Config) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    collection.clear_snippets().await?;
    println!("Cleared all snippets.");
    Ok(())
}
