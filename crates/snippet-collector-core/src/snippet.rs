//! Snippet records and the normalizer that produces them.
//!
//! A [`RawSnippet`] is whatever the capture layer (or an old stored record)
//! hands us: any subset of fields, possibly with the wrong JSON types.
//! [`normalize_snippet`] turns it into a canonical [`Snippet`] with every
//! field populated and a content hash computed from `code`.
//!
//! # Hash
//!
//! [`hash_code`] is the classic `h * 31 + c` rolling hash over UTF-16 code
//! units with 32-bit signed wraparound, rendered in decimal. Records that
//! were stored by earlier versions carry hashes computed the same way, so
//! deduplication stays compatible. It has no collision resistance: two
//! different snippets with the same hash are treated as duplicates.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A canonical, fully-populated snippet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub code: String,
    pub source_url: String,
    pub page_title: String,
    /// Language tag; empty means unknown.
    pub language: String,
    pub tags: Vec<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub hash: String,
}

/// A capture payload or a stored record of unknown quality.
///
/// Deserialization never fails on a JSON object: fields of the wrong type
/// read as absent, numeric ids and hashes are rendered as strings, and
/// non-string tags are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSnippet {
    #[serde(deserialize_with = "lenient::string_or_number")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub code: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub source_url: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub page_title: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub language: Option<String>,
    #[serde(deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient::integer")]
    pub created_at: Option<i64>,
    #[serde(deserialize_with = "lenient::string_or_number")]
    pub hash: Option<String>,
    #[serde(deserialize_with = "lenient::integer")]
    pub max_history: Option<i64>,
}

impl RawSnippet {
    /// Raw payload carrying only `code`.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The id, if present and non-empty.
    pub fn present_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

impl From<Snippet> for RawSnippet {
    fn from(s: Snippet) -> Self {
        Self {
            id: Some(s.id),
            code: Some(s.code),
            source_url: Some(s.source_url),
            page_title: Some(s.page_title),
            language: Some(s.language),
            tags: s.tags,
            created_at: Some(s.created_at),
            hash: Some(s.hash),
            max_history: None,
        }
    }
}

/// Canonicalize a raw capture into a [`Snippet`].
///
/// - `code` defaults to `""`.
/// - `tags` are trimmed and empty ones dropped; order is kept.
/// - `id` is a fresh UUID v4 when absent or empty.
/// - `created_at` defaults to now when absent or zero.
/// - `hash` defaults to [`hash_code`] of `code` when absent or empty.
pub fn normalize_snippet(raw: RawSnippet) -> Snippet {
    normalize_snippet_at(raw, Utc::now().timestamp_millis())
}

/// [`normalize_snippet`] with an explicit "now" in epoch milliseconds.
pub fn normalize_snippet_at(raw: RawSnippet, now_ms: i64) -> Snippet {
    let code = raw.code.unwrap_or_default();
    let tags = raw
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    let id = raw
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let created_at = raw.created_at.filter(|ts| *ts != 0).unwrap_or(now_ms);
    let hash = raw
        .hash
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| hash_code(&code));

    Snippet {
        id,
        code,
        source_url: raw.source_url.unwrap_or_default(),
        page_title: raw.page_title.unwrap_or_default(),
        language: raw.language.unwrap_or_default(),
        tags,
        created_at,
        hash,
    }
}

/// Split a comma-separated tag list, trimming each tag and dropping empties.
pub fn parse_tag_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deterministic 32-bit rolling hash of `text`, in decimal. `""` → `"0"`.
pub fn hash_code(text: &str) -> String {
    if text.is_empty() {
        return "0".to_string();
    }
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    hash.to_string()
}

mod lenient {
    use super::*;

    pub fn string<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn string_or_number<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn integer<'de, D>(d: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            _ => None,
        })
    }

    pub fn tags<'de, D>(d: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }
}
