//! Export the snippet collection as JSON or Markdown.
//!
//! Both exporters read the collection in stored order (newest first) and
//! return an [`ExportBlob`]: the encoded bytes plus their MIME type, ready
//! for the UI layer to offer as a download.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::collection::SnippetCollection;
use crate::snippet::Snippet;

pub const JSON_MIME: &str = "application/json";
pub const MARKDOWN_MIME: &str = "text/markdown";

const MARKDOWN_TITLE: &str = "# Smart Code Collector Export";
const UNTITLED: &str = "Untitled Snippet";

/// Encoded export payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl ExportBlob {
    pub fn new(mime_type: &'static str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The payload as text. Both exporters emit UTF-8.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.data).context("export payload is not valid UTF-8")
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
fn iso_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn iso_from_epoch_ms(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(iso_millis)
        .unwrap_or_else(|| ms.to_string())
}

/// Pretty-printed (2-space) JSON array of `snippets`.
pub fn snippets_to_json(snippets: &[Snippet]) -> Result<String> {
    serde_json::to_string_pretty(snippets).context("failed to serialize snippets")
}

/// Render `snippets` as a Markdown document.
///
/// With `include_header`, the document opens with a title and the export
/// time. Each snippet becomes a level-2 section followed by a fenced code
/// block tagged with its language.
pub fn snippets_to_markdown(
    snippets: &[Snippet],
    include_header: bool,
    exported_at: DateTime<Utc>,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    if include_header {
        lines.push(MARKDOWN_TITLE.to_string());
        lines.push(String::new());
        lines.push(format!("Exported: {}", iso_millis(exported_at)));
        lines.push(String::new());
    }
    for snippet in snippets {
        let title = if snippet.page_title.is_empty() {
            UNTITLED
        } else {
            snippet.page_title.as_str()
        };
        lines.push(format!("## {}", title));
        if !snippet.source_url.is_empty() {
            lines.push(format!("Source: {}", snippet.source_url));
        }
        lines.push(format!("Created: {}", iso_from_epoch_ms(snippet.created_at)));
        if !snippet.tags.is_empty() {
            lines.push(format!("Tags: {}", snippet.tags.join(", ")));
        }
        lines.push(String::new());
        lines.push(format!("```{}", snippet.language));
        lines.push(snippet.code.clone());
        lines.push("```".to_string());
        lines.push(String::new());
    }
    lines.join("\n")
}

impl SnippetCollection {
    /// The collection as `application/json`.
    pub async fn export_snippets_json(&self) -> Result<ExportBlob> {
        let snippets = self.get_snippets().await?;
        Ok(ExportBlob::new(JSON_MIME, snippets_to_json(&snippets)?))
    }

    /// The collection as `text/markdown`, stamped with the current time.
    pub async fn export_snippets_markdown(&self) -> Result<ExportBlob> {
        self.export_snippets_markdown_at(Utc::now()).await
    }

    /// The collection as `text/markdown`, stamped with `exported_at`.
    pub async fn export_snippets_markdown_at(
        &self,
        exported_at: DateTime<Utc>,
    ) -> Result<ExportBlob> {
        let settings = self.settings().load_settings().await?;
        let snippets = self.get_snippets().await?;
        let doc = snippets_to_markdown(&snippets, settings.include_markdown_header, exported_at);
        Ok(ExportBlob::new(MARKDOWN_MIME, doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsPatch;
    use crate::snippet::RawSnippet;
    use crate::store::memory::InMemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn export_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    fn collection() -> SnippetCollection {
        SnippetCollection::new(Arc::new(InMemoryStore::new()))
    }

    #[test]
    fn test_iso_format_has_millis_and_z() {
        assert_eq!(iso_millis(export_time()), "2024-05-01T12:30:00.000Z");
        assert_eq!(iso_from_epoch_ms(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[tokio::test]
    async fn test_markdown_empty_collection_header_only() {
        let c = collection();
        let blob = c.export_snippets_markdown_at(export_time()).await.unwrap();
        assert_eq!(blob.mime_type, MARKDOWN_MIME);
        assert_eq!(
            blob.as_str().unwrap(),
            "# Smart Code Collector Export\n\nExported: 2024-05-01T12:30:00.000Z\n"
        );
    }

    #[tokio::test]
    async fn test_markdown_without_header() {
        let c = collection();
        c.settings()
            .save_settings(&SettingsPatch {
                include_markdown_header: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        let blob = c.export_snippets_markdown_at(export_time()).await.unwrap();
        assert_eq!(blob.as_str().unwrap(), "");

        c.add_snippet(
            RawSnippet {
                id: Some("a".into()),
                code: Some("echo hi".into()),
                created_at: Some(1_700_000_000_123),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
        let blob = c.export_snippets_markdown_at(export_time()).await.unwrap();
        assert_eq!(
            blob.as_str().unwrap(),
            "## Untitled Snippet\nCreated: 2023-11-14T22:13:20.123Z\n\n```\necho hi\n```\n"
        );
    }

    #[tokio::test]
    async fn test_markdown_full_sections_in_stored_order() {
        let c = collection();
        c.add_snippet(
            RawSnippet {
                id: Some("old".into()),
                code: Some("print(1)".into()),
                language: Some("python".into()),
                page_title: Some("Py Docs".into()),
                source_url: Some("https://py.example".into()),
                tags: vec!["py".into(), "basics".into()],
                created_at: Some(1_700_000_000_000),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
        c.add_snippet(
            RawSnippet {
                id: Some("new".into()),
                code: Some("fn main() {}".into()),
                language: Some("rust".into()),
                created_at: Some(1_700_000_001_000),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

        let blob = c.export_snippets_markdown_at(export_time()).await.unwrap();
        let expected = "\
# Smart Code Collector Export

Exported: 2024-05-01T12:30:00.000Z

## Untitled Snippet
Created: 2023-11-14T22:13:21.000Z

```rust
fn main() {}
```

## Py Docs
Source: https://py.example
Created: 2023-11-14T22:13:20.000Z
Tags: py, basics

```python
print(1)
```
";
        assert_eq!(blob.as_str().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_json_export_is_pretty_array() {
        let c = collection();
        let blob = c.export_snippets_json().await.unwrap();
        assert_eq!(blob.mime_type, JSON_MIME);
        assert_eq!(blob.as_str().unwrap(), "[]");

        c.add_snippet(
            RawSnippet {
                id: Some("a".into()),
                code: Some("x".into()),
                tags: vec!["t".into()],
                created_at: Some(9),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
        let blob = c.export_snippets_json().await.unwrap();
        let expected = r#"[
  {
    "id": "a",
    "code": "x",
    "sourceUrl": "",
    "pageTitle": "",
    "language": "",
    "tags": [
      "t"
    ],
    "createdAt": 9,
    "hash": "120"
  }
]"#;
        assert_eq!(blob.as_str().unwrap(), expected);
    }
}
