//! SQLite-backed [`KeyValueStore`] implementation.
//!
//! The persistent backend: every key is one row of the `kv_store` table,
//! its value kept as JSON text. A single `set` call writes all of its keys
//! inside one transaction, so a reader never sees half of a multi-key write.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use snippet_collector_core::store::KeyValueStore;

/// SQLite implementation of the [`KeyValueStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path` and ensure the
    /// schema exists.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create storage directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let mut found = Map::new();
        for key in keys {
            let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
                .bind(*key)
                .fetch_optional(&self.pool)
                .await?;
            let Some(row) = row else {
                continue;
            };
            let text: String = row.get("value");
            let value: Value = serde_json::from_str(&text)
                .with_context(|| format!("Stored value for '{}' is not valid JSON", key))?;
            found.insert((*key).to_string(), value);
        }
        Ok(found)
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        for (key, value) in &items {
            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key.as_str())
            .bind(serde_json::to_string(value)?)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM kv_store WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
