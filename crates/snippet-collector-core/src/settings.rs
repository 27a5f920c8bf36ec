//! User settings: typed record, partial patches, and the settings manager.
//!
//! The stored settings record may be older than the running code, or may
//! only contain the fields a user changed. Reads therefore always merge the
//! stored value over [`Settings::default`], and writes merge a
//! [`SettingsPatch`] over the current record instead of replacing it.
//!
//! # Merge contract
//!
//! [`Settings::apply`] overlays every `Some` field of a patch onto the
//! record, one nesting level at a time (`sanitize`, `integrations.gist`,
//! `integrations.llm`). Fields left as `None` keep their current value.
//! Sequence-valued fields, should any be added, are replaced wholesale and
//! never merged element by element.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{KeyValueStore, SETTINGS_KEY};

/// Smallest history cap the UI lets a user pick.
pub const MIN_HISTORY: usize = 50;
/// Largest history cap the UI lets a user pick.
pub const MAX_HISTORY: usize = 1000;
/// History cap used when nothing else is configured.
pub const DEFAULT_MAX_HISTORY: usize = 200;

/// Clamp a user-entered history cap into `[MIN_HISTORY, MAX_HISTORY]`.
pub fn clamp_max_history(value: usize) -> usize {
    value.clamp(MIN_HISTORY, MAX_HISTORY)
}

/// The full settings record. Always fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub saving_enabled: bool,
    pub max_history: usize,
    pub include_markdown_header: bool,
    pub sanitize: SanitizeSettings,
    pub integrations: IntegrationSettings,
}

/// Which cleanups the capture layer applies to copied code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeSettings {
    pub strip_prompts: bool,
    pub strip_line_numbers: bool,
    pub strip_comments: bool,
    pub strip_empty_lines: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    pub gist: GistSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistSettings {
    pub enabled: bool,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: String,
}

impl Default for SanitizeSettings {
    fn default() -> Self {
        Self {
            strip_prompts: true,
            strip_line_numbers: true,
            strip_comments: false,
            strip_empty_lines: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            saving_enabled: true,
            max_history: DEFAULT_MAX_HISTORY,
            include_markdown_header: true,
            sanitize: SanitizeSettings::default(),
            integrations: IntegrationSettings::default(),
        }
    }
}

/// Returns a fresh, independently owned copy of the default settings.
pub fn default_settings() -> Settings {
    Settings::default()
}

/// A partial settings record. Every field is optional.
///
/// This is also the shape stored records are read through, so that a
/// record written by an older version (missing newer fields) still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saving_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_history: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_markdown_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitize: Option<SanitizePatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrations: Option<IntegrationsPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SanitizePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_prompts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_line_numbers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_empty_lines: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gist: Option<GistPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GistPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn overlay<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

impl Settings {
    /// Overlay every present field of `patch` onto `self`.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        overlay(&mut self.saving_enabled, &patch.saving_enabled);
        overlay(&mut self.max_history, &patch.max_history);
        overlay(
            &mut self.include_markdown_header,
            &patch.include_markdown_header,
        );
        if let Some(sanitize) = &patch.sanitize {
            self.sanitize.apply(sanitize);
        }
        if let Some(integrations) = &patch.integrations {
            if let Some(gist) = &integrations.gist {
                overlay(&mut self.integrations.gist.enabled, &gist.enabled);
                overlay(&mut self.integrations.gist.token, &gist.token);
            }
            if let Some(llm) = &integrations.llm {
                overlay(&mut self.integrations.llm.enabled, &llm.enabled);
                overlay(&mut self.integrations.llm.endpoint, &llm.endpoint);
                overlay(&mut self.integrations.llm.api_key, &llm.api_key);
            }
        }
    }

    /// Consume `self` and return it with `patch` applied.
    pub fn merged(mut self, patch: &SettingsPatch) -> Self {
        self.apply(patch);
        self
    }

    /// Defaults with `patch` applied on top.
    pub fn from_patch(patch: &SettingsPatch) -> Self {
        Self::default().merged(patch)
    }
}

impl SanitizeSettings {
    pub fn apply(&mut self, patch: &SanitizePatch) {
        overlay(&mut self.strip_prompts, &patch.strip_prompts);
        overlay(&mut self.strip_line_numbers, &patch.strip_line_numbers);
        overlay(&mut self.strip_comments, &patch.strip_comments);
        overlay(&mut self.strip_empty_lines, &patch.strip_empty_lines);
    }
}

/// Interpret a stored JSON value as a settings patch.
///
/// `null`, `false`, and other non-objects read as "nothing stored". Each
/// field is read on its own: a field of the wrong type is logged and left
/// at its default, and its siblings still apply.
fn parse_stored(value: Option<Value>) -> Option<SettingsPatch> {
    match value? {
        Value::Object(obj) => Some(stored::patch(&obj)),
        _ => None,
    }
}

mod stored {
    use serde_json::{Map, Value};

    use super::{GistPatch, IntegrationsPatch, LlmPatch, SanitizePatch, SettingsPatch};

    fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
        obj.get(key).filter(|v| !v.is_null())
    }

    fn typed<T>(
        obj: &Map<String, Value>,
        key: &str,
        read: impl FnOnce(&Value) -> Option<T>,
    ) -> Option<T> {
        let value = field(obj, key)?;
        let parsed = read(value);
        if parsed.is_none() {
            tracing::warn!(field = key, value = %value, "ignoring mistyped stored setting");
        }
        parsed
    }

    fn boolean(obj: &Map<String, Value>, key: &str) -> Option<bool> {
        typed(obj, key, Value::as_bool)
    }

    fn string(obj: &Map<String, Value>, key: &str) -> Option<String> {
        typed(obj, key, |v| v.as_str().map(str::to_string))
    }

    fn count(obj: &Map<String, Value>, key: &str) -> Option<usize> {
        typed(obj, key, |v| v.as_u64().and_then(|n| usize::try_from(n).ok()))
    }

    fn object<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
        let value = field(obj, key)?;
        let nested = value.as_object();
        if nested.is_none() {
            tracing::warn!(field = key, value = %value, "ignoring mistyped stored setting");
        }
        nested
    }

    pub(super) fn patch(obj: &Map<String, Value>) -> SettingsPatch {
        SettingsPatch {
            saving_enabled: boolean(obj, "savingEnabled"),
            max_history: count(obj, "maxHistory"),
            include_markdown_header: boolean(obj, "includeMarkdownHeader"),
            sanitize: object(obj, "sanitize").map(|s| SanitizePatch {
                strip_prompts: boolean(s, "stripPrompts"),
                strip_line_numbers: boolean(s, "stripLineNumbers"),
                strip_comments: boolean(s, "stripComments"),
                strip_empty_lines: boolean(s, "stripEmptyLines"),
            }),
            integrations: object(obj, "integrations").map(|i| IntegrationsPatch {
                gist: object(i, "gist").map(|g| GistPatch {
                    enabled: boolean(g, "enabled"),
                    token: string(g, "token"),
                }),
                llm: object(i, "llm").map(|l| LlmPatch {
                    enabled: boolean(l, "enabled"),
                    endpoint: string(l, "endpoint"),
                    api_key: string(l, "apiKey"),
                }),
            }),
        }
    }
}

/// Loads and persists the [`Settings`] record through a [`KeyValueStore`].
#[derive(Clone)]
pub struct SettingsManager {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read_stored(&self) -> Result<Option<SettingsPatch>> {
        let stored = self.store.get_value(SETTINGS_KEY).await?;
        Ok(parse_stored(stored))
    }

    async fn persist(&self, settings: &Settings) -> Result<()> {
        self.store
            .set_value(SETTINGS_KEY, serde_json::to_value(settings)?)
            .await
    }

    /// Stored settings merged over defaults. Absent record → defaults.
    pub async fn load_settings(&self) -> Result<Settings> {
        let stored = self.read_stored().await?.unwrap_or_default();
        Ok(Settings::from_patch(&stored))
    }

    /// Merge `patch` over the current settings and persist the result.
    pub async fn save_settings(&self, patch: &SettingsPatch) -> Result<Settings> {
        let next = self.load_settings().await?.merged(patch);
        self.persist(&next).await?;
        Ok(next)
    }

    /// Persist `full` merged over defaults, ignoring whatever is stored.
    pub async fn overwrite_settings(&self, full: &SettingsPatch) -> Result<Settings> {
        let normalized = Settings::from_patch(full);
        self.persist(&normalized).await?;
        Ok(normalized)
    }

    /// Restore the default record.
    pub async fn reset_settings(&self) -> Result<Settings> {
        self.overwrite_settings(&SettingsPatch::default()).await
    }

    /// Persist defaults on first run, or upgrade an existing record so it
    /// carries every current field. Safe to call repeatedly.
    pub async fn init_settings_if_missing(&self) -> Result<Settings> {
        match self.read_stored().await? {
            Some(existing) => self.overwrite_settings(&existing).await,
            None => self.overwrite_settings(&SettingsPatch::default()).await,
        }
    }
}
