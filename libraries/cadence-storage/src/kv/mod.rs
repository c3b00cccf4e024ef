//! Generic string key-value store
//!
//! Backs both the session snapshot and the metadata cache. Values are opaque
//! strings; callers own their encoding.

use async_trait::async_trait;
use cadence_core::KeyValueStore;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;

/// Get a value by key
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get("value")))
}

/// Insert or overwrite a value
pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a key. Removing a missing key is a no-op.
pub async fn remove(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM kv_store WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}

/// Number of keys starting with `prefix`
pub async fn count_prefix(pool: &SqlitePool, prefix: &str) -> Result<i64> {
    let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
    let row = sqlx::query("SELECT COUNT(*) AS total FROM kv_store WHERE key LIKE ? ESCAPE '\\'")
        .bind(pattern)
        .fetch_one(pool)
        .await?;

    Ok(row.get("total"))
}

/// `SQLite`-backed key-value store
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> cadence_core::Result<Option<String>> {
        Ok(get(&self.pool, key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> cadence_core::Result<()> {
        Ok(set(&self.pool, key, value).await?)
    }

    async fn remove(&self, key: &str) -> cadence_core::Result<()> {
        Ok(remove(&self.pool, key).await?)
    }
}

/// In-process key-value store for ephemeral sessions
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> cadence_core::Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> cadence_core::Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> cadence_core::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
