//! `SQLite`-backed state store.

use async_trait::async_trait;
use sqlx::Row;
use tracing::instrument;

use super::{KeyValueStore, Result};
use crate::db::Database;

/// Persisted state in the `kv_state` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Creates a store over an opened database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns the underlying database.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    #[instrument(level = "trace", skip(self))]
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(r"SELECT value FROM kv_state WHERE key = ?")
            .bind(key)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    #[instrument(level = "trace", skip(self, value))]
    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        sqlx::query(
            r"INSERT INTO kv_state (key, value, updated_at)
              VALUES (?, ?, datetime('now'))
              ON CONFLICT(key) DO UPDATE
              SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    async fn remove_raw(&self, key: &str) -> Result<()> {
        sqlx::query(r"DELETE FROM kv_state WHERE key = ?")
            .bind(key)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}
