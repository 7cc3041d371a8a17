//! Persisted extension state: personas, the active-persona pointer, the
//! allow-listed hosts and per-persona cookie snapshots.
//!
//! # Overview
//!
//! - [`StateStore`] - the typed boundary the coordinator and registry depend on
//! - [`KeyValueStore`] - raw JSON-valued key/value backend; every backend gets
//!   [`StateStore`] for free
//! - [`MemoryStore`] - in-process backend
//! - [`SqliteStore`] - `SQLite` backend built on [`crate::Database`]
//!
//! Logical keys: `personas`, `activePersonaId`, `allowedHosts` and one
//! `cookies_<personaId>` entry per persona.

mod error;
mod memory;
mod sqlite;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::cookie::CookieRecord;
use crate::persona::Persona;

/// Key holding the persona list.
pub const PERSONAS_KEY: &str = "personas";

/// Key holding the active-persona pointer.
pub const ACTIVE_PERSONA_KEY: &str = "activePersonaId";

/// Key holding the allow-listed hosts.
pub const ALLOWED_HOSTS_KEY: &str = "allowedHosts";

/// Returns the key holding a persona's cookie snapshot.
#[must_use]
pub fn cookies_key(persona_id: &str) -> String {
    format!("cookies_{persona_id}")
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Raw key/value persistence with JSON-encoded values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the raw value stored under `key`.
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set_raw(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove_raw(&self, key: &str) -> Result<()>;
}

/// Typed access to persisted state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns the allow-listed hosts in insertion order.
    async fn get_allowed_hosts(&self) -> Result<Vec<String>>;

    /// Replaces the allow-listed hosts.
    async fn save_allowed_hosts(&self, hosts: &[String]) -> Result<()>;

    /// Returns the stored cookie snapshot for a persona (empty when none).
    async fn get_cookies(&self, persona_id: &str) -> Result<Vec<CookieRecord>>;

    /// Replaces the stored cookie snapshot for a persona.
    async fn save_cookies(&self, persona_id: &str, cookies: &[CookieRecord]) -> Result<()>;

    /// Deletes the stored cookie snapshot for a persona.
    async fn delete_cookies(&self, persona_id: &str) -> Result<()>;

    /// Returns all personas in creation order.
    async fn get_personas(&self) -> Result<Vec<Persona>>;

    /// Replaces the persona list.
    async fn save_personas(&self, personas: &[Persona]) -> Result<()>;

    /// Returns the active-persona pointer.
    async fn get_active_persona_id(&self) -> Result<Option<String>>;

    /// Sets or clears the active-persona pointer.
    async fn set_active_persona_id(&self, persona_id: Option<&str>) -> Result<()>;
}

async fn get_json<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = store.get_raw(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })
}

async fn set_json<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized + Sync,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set_raw(key, raw).await
}

#[async_trait]
impl<S> StateStore for S
where
    S: KeyValueStore + ?Sized,
{
    async fn get_allowed_hosts(&self) -> Result<Vec<String>> {
        Ok(get_json(self, ALLOWED_HOSTS_KEY).await?.unwrap_or_default())
    }

    #[instrument(level = "debug", skip(self, hosts), fields(count = hosts.len()))]
    async fn save_allowed_hosts(&self, hosts: &[String]) -> Result<()> {
        set_json(self, ALLOWED_HOSTS_KEY, hosts).await
    }

    async fn get_cookies(&self, persona_id: &str) -> Result<Vec<CookieRecord>> {
        Ok(get_json(self, &cookies_key(persona_id))
            .await?
            .unwrap_or_default())
    }

    #[instrument(level = "debug", skip(self, cookies), fields(count = cookies.len()))]
    async fn save_cookies(&self, persona_id: &str, cookies: &[CookieRecord]) -> Result<()> {
        set_json(self, &cookies_key(persona_id), cookies).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_cookies(&self, persona_id: &str) -> Result<()> {
        self.remove_raw(&cookies_key(persona_id)).await
    }

    async fn get_personas(&self) -> Result<Vec<Persona>> {
        Ok(get_json(self, PERSONAS_KEY).await?.unwrap_or_default())
    }

    #[instrument(level = "debug", skip(self, personas), fields(count = personas.len()))]
    async fn save_personas(&self, personas: &[Persona]) -> Result<()> {
        set_json(self, PERSONAS_KEY, personas).await
    }

    async fn get_active_persona_id(&self) -> Result<Option<String>> {
        let stored: Option<Option<String>> = get_json(self, ACTIVE_PERSONA_KEY).await?;
        Ok(stored.flatten())
    }

    #[instrument(level = "debug", skip(self))]
    async fn set_active_persona_id(&self, persona_id: Option<&str>) -> Result<()> {
        match persona_id {
            Some(id) => set_json(self, ACTIVE_PERSONA_KEY, id).await,
            None => self.remove_raw(ACTIVE_PERSONA_KEY).await,
        }
    }
}
