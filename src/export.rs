//! Export the snippet collection to a file or stdout.
//!
//! Wraps the core exporters: `json` produces the pretty-printed collection,
//! `markdown` a document with one section per snippet.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;

use snippet_collector_core::export::ExportBlob;

use crate::config::Config;
use crate::storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => bail!("Unknown export format: {}. Use json or markdown.", other),
        }
    }
}

/// Export the collection.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    let blob = match format {
        ExportFormat::Json => collection.export_snippets_json().await?,
        ExportFormat::Markdown => collection.export_snippets_markdown().await?,
    };
    write_blob(&blob, output)
}

fn write_blob(blob: &ExportBlob, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &blob.data)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            eprintln!(
                "Exported {} bytes ({}) to {}",
                blob.len(),
                blob.mime_type,
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&blob.data)?;
            if !blob.data.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snippet_collector_core::export::JSON_MIME;
    use tempfile::TempDir;

    #[test]
    fn test_parse_format() {
        assert_eq!(ExportFormat::parse("JSON").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("md").unwrap(), ExportFormat::Markdown);
        assert!(ExportFormat::parse("csv").is_err());
    }

    #[test]
    fn test_write_blob_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out/nested/snippets.json");
        write_blob(&ExportBlob::new(JSON_MIME, "[]"), Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
