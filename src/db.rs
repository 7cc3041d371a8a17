//! `SQLite` file behind [`SqliteStore`](crate::SqliteStore).
//!
//! Every piece of persona state lives in one `kv_state` table created by the
//! migrations in `migrations/`. A CLI invocation opens the file, runs at
//! most one switch and exits, so the pool stays small; WAL lets a `status`
//! read proceed while another process is mid-switch.
//!
//! ```no_run
//! use alterego_core::{Database, SqliteStore};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new(Database::new(Path::new("state.db")).await?);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::instrument;

/// Concurrent readers of one state file; writes still serialize on the file lock.
const MAX_STATE_CONNECTIONS: u32 = 4;

/// How long a write waits on another `alterego` process before `SQLITE_BUSY`.
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Failures opening or preparing the state file.
#[derive(Error, Debug)]
pub enum DbError {
    /// The file could not be opened or configured, or is not a database.
    #[error("cannot open state database: {0}")]
    Connection(#[from] sqlx::Error),

    /// The `kv_state` schema could not be brought up to date.
    #[error("cannot migrate state database: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pooled connection to the persona state file.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the state database at `db_path`.
    ///
    /// Enables WAL mode, sets the busy timeout and runs pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] when the path is not a usable `SQLite`
    /// file, or [`DbError::Migration`] when the schema cannot be applied.
    #[instrument(skip(db_path), fields(path = %db_path.display()))]
    pub async fn new(db_path: &Path) -> Result<Self, DbError> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_STATE_CONNECTIONS)
            .connect(&db_url)
            .await?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;

        sqlx::query(&format!("PRAGMA busy_timeout={BUSY_TIMEOUT_MS}"))
            .execute(&pool)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Creates a throwaway state database for tests.
    ///
    /// Each `sqlite::memory:` connection is its own database, so the pool is
    /// pinned to one connection. WAL does not apply to memory databases.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the connection fails,
    /// or `DbError::Migration` if migrations fail.
    #[instrument]
    pub async fn new_in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Pool used by [`SqliteStore`](crate::SqliteStore) queries.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns whether the state file is in WAL mode.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the query fails.
    #[instrument(skip(self))]
    pub async fn is_wal_enabled(&self) -> Result<bool, DbError> {
        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0.to_lowercase() == "wal")
    }

    /// Closes the pool so the state file can be reopened or removed.
    #[instrument(skip(self))]
    pub async fn close(self) {
        self.pool.close().await;
    }
}
