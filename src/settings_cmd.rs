//! `scc settings`: inspect and change the stored user settings.

use anyhow::{Context, Result};

use snippet_collector_core::settings::{clamp_max_history, Settings, SettingsPatch};

use crate::config::Config;
use crate::storage;

fn print_settings(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

pub async fn run_show(config: &Config) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    let settings = collection.settings().load_settings().await?;
    print_settings(&settings)
}

/// Deep-merge a JSON patch such as `{"sanitize": {"stripComments": true}}`.
pub async fn run_set(config: &Config, patch_json: &str) -> Result<()> {
    let patch: SettingsPatch =
        serde_json::from_str(patch_json).context("Settings patch is not a valid settings object")?;
    let collection = storage::open_collection(config).await?;
    let settings = collection.settings().save_settings(&patch).await?;
    print_settings(&settings)
}

/// Set the history cap, clamped to the range the UI allows.
pub async fn run_set_history(config: &Config, value: usize) -> Result<()> {
    let clamped = clamp_max_history(value);
    if clamped != value {
        eprintln!("maxHistory {} out of range, using {}", value, clamped);
    }
    let collection = storage::open_collection(config).await?;
    let settings = collection
        .settings()
        .save_settings(&SettingsPatch {
            max_history: Some(clamped),
            ..Default::default()
        })
        .await?;
    print_settings(&settings)
}

pub async fn run_reset(config: &Config) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    let settings = collection.settings().reset_settings().await?;
    print_settings(&settings)
}

/// `scc init`: create the store and write (or upgrade) the settings record.
pub async fn run_init(config: &Config) -> Result<()> {
    let collection = storage::open_collection(config).await?;
    collection.settings().init_settings_if_missing().await?;
    println!(
        "Store initialized ({:?} at {}).",
        config.storage.backend,
        config.storage.path.display()
    );
    Ok(())
}
