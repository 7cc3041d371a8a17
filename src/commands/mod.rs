//! CLI command handlers.

mod host;
mod persona;
mod status;
mod switch;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use alterego_core::{Database, SqliteStore};
use anyhow::{Context, Result};
use tracing::debug;

pub use host::{run_host_add_command, run_host_list_command, run_host_remove_command};
pub use persona::{run_persona_add_command, run_persona_list_command, run_persona_remove_command};
pub use status::run_status_command;
pub use switch::run_use_command;

/// Opens (creating if needed) the state database behind every command.
async fn open_state_store(state_db: &Path) -> Result<Arc<SqliteStore>> {
    if let Some(parent) = state_db.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create state directory '{}'", parent.display())
        })?;
    }

    let db = Database::new(state_db)
        .await
        .with_context(|| format!("Failed to open state database '{}'", state_db.display()))?;
    debug!(path = %state_db.display(), "opened state database");
    Ok(Arc::new(SqliteStore::new(db)))
}
