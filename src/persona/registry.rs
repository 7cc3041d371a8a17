//! Persona and allow-list management.
//!
//! The registry is the only writer of persona/host configuration. Selecting a
//! persona writes the active-persona pointer and raises the change
//! notification that drives a switch. Deleting a persona or removing an
//! allow-listed host waits on the [`SwitchGate`], so neither can interleave
//! with a switch that is already running.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::model::Persona;
use super::name::{PersonaNameError, validate_persona_name};
use crate::hosts::{HostError, normalize_host_input};
use crate::store::{StateStore, StoreError};
use crate::switch::{SwitchError, SwitchEvent, SwitchGate, SwitchNotifier};

/// Errors from persona and allow-list management.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Persona name failed validation.
    #[error(transparent)]
    InvalidName(#[from] PersonaNameError),

    /// Hostname failed validation.
    #[error(transparent)]
    InvalidHost(#[from] HostError),

    /// No persona has the given id or name.
    #[error("persona not found: '{0}'\n  Suggestion: run `alterego persona list` to see persona names")]
    PersonaNotFound(String),

    /// Persisted state could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The change notification could not be delivered.
    #[error(transparent)]
    Switch(#[from] SwitchError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Manages personas, the active-persona pointer and the allow-list.
pub struct PersonaRegistry {
    store: Arc<dyn StateStore>,
    gate: SwitchGate,
    notifier: Option<SwitchNotifier>,
    config_lock: Mutex<()>,
}

impl PersonaRegistry {
    /// Creates a registry over `store` with no switch wiring.
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            gate: SwitchGate::new(),
            notifier: None,
            config_lock: Mutex::new(()),
        }
    }

    /// Shares the coordinator's gate so deletions wait for in-flight switches.
    #[must_use]
    pub fn with_gate(mut self, gate: SwitchGate) -> Self {
        self.gate = gate;
        self
    }

    /// Sends change notifications to a dispatcher.
    #[must_use]
    pub fn with_switch_notifier(mut self, notifier: SwitchNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Validates `name` and stores a new persona.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidName`] for rejected names, or
    /// [`RegistryError::Store`] when state cannot be persisted.
    #[instrument(skip(self))]
    pub async fn create_persona(&self, name: &str) -> Result<Persona> {
        let _config = self.config_lock.lock().await;
        let mut personas = self.store.get_personas().await?;
        let name = validate_persona_name(name, &personas)?;

        let persona = Persona::new(name);
        personas.push(persona.clone());
        self.store.save_personas(&personas).await?;

        info!(id = %persona.id, name = %persona.name, "created persona");
        Ok(persona)
    }

    /// Returns all personas in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when state cannot be read.
    pub async fn list_personas(&self) -> Result<Vec<Persona>> {
        Ok(self.store.get_personas().await?)
    }

    /// Finds a persona by id, or by name ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when state cannot be read.
    pub async fn find_persona(&self, needle: &str) -> Result<Option<Persona>> {
        let personas = self.store.get_personas().await?;
        let by_id = personas.iter().find(|persona| persona.id == needle);
        Ok(by_id
            .or_else(|| personas.iter().find(|persona| persona.matches(needle)))
            .cloned())
    }

    /// Returns the persona the active pointer refers to.
    ///
    /// A pointer to a persona that no longer exists reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when state cannot be read.
    pub async fn active_persona(&self) -> Result<Option<Persona>> {
        let Some(active_id) = self.store.get_active_persona_id().await? else {
            return Ok(None);
        };
        let personas = self.store.get_personas().await?;
        Ok(personas.into_iter().find(|persona| persona.id == active_id))
    }

    /// Points the active-persona pointer at `persona_id` (or clears it).
    ///
    /// Returns the change event when the pointer actually changed; the event
    /// has already been handed to the dispatcher when one is wired in.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PersonaNotFound`] for unknown ids,
    /// [`RegistryError::Store`] on persistence failure, or
    /// [`RegistryError::Switch`] when the dispatcher has shut down.
    #[instrument(skip(self))]
    pub async fn select_persona(&self, persona_id: Option<&str>) -> Result<Option<SwitchEvent>> {
        let _config = self.config_lock.lock().await;
        let personas = self.store.get_personas().await?;

        if let Some(id) = persona_id
            && !personas.iter().any(|persona| persona.id == id)
        {
            return Err(RegistryError::PersonaNotFound(id.to_string()));
        }

        let previous = self.store.get_active_persona_id().await?;
        // A dangling pointer has no persona left to save cookies for.
        let previous = previous.filter(|id| personas.iter().any(|persona| &persona.id == id));

        if previous.as_deref() == persona_id {
            info!("persona already active; nothing to switch");
            return Ok(None);
        }

        self.store.set_active_persona_id(persona_id).await?;
        let event = SwitchEvent::new(previous.as_deref(), persona_id);
        info!(old = ?event.old, new = ?event.new, "active persona changed");

        if let Some(notifier) = &self.notifier {
            notifier.notify(event.clone())?;
        }
        Ok(Some(event))
    }

    /// Deletes a persona along with its cookie snapshot.
    ///
    /// Clears the active pointer when it referred to the deleted persona,
    /// without raising a switch. Waits for any in-flight switch to finish.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PersonaNotFound`] for unknown ids, or
    /// [`RegistryError::Store`] on persistence failure.
    #[instrument(skip(self))]
    pub async fn delete_persona(&self, persona_id: &str) -> Result<Persona> {
        let _in_flight = self.gate.acquire().await;
        let _config = self.config_lock.lock().await;

        let mut personas = self.store.get_personas().await?;
        let Some(index) = personas.iter().position(|persona| persona.id == persona_id) else {
            return Err(RegistryError::PersonaNotFound(persona_id.to_string()));
        };
        let removed = personas.remove(index);

        self.store.save_personas(&personas).await?;
        self.store.delete_cookies(&removed.id).await?;

        if self.store.get_active_persona_id().await?.as_deref() == Some(removed.id.as_str()) {
            self.store.set_active_persona_id(None).await?;
            warn!(id = %removed.id, "deleted the active persona; no persona is active now");
        }

        info!(id = %removed.id, name = %removed.name, "deleted persona");
        Ok(removed)
    }

    /// Returns the allow-listed hosts in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] when state cannot be read.
    pub async fn allowed_hosts(&self) -> Result<Vec<String>> {
        Ok(self.store.get_allowed_hosts().await?)
    }

    /// Normalizes `input` and appends it to the allow-list.
    ///
    /// Returns the normalized host and whether it was newly added.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidHost`] for unusable input, or
    /// [`RegistryError::Store`] on persistence failure.
    #[instrument(skip(self))]
    pub async fn add_allowed_host(&self, input: &str) -> Result<(String, bool)> {
        let host = normalize_host_input(input)?;
        let _config = self.config_lock.lock().await;

        let mut hosts = self.store.get_allowed_hosts().await?;
        if hosts.contains(&host) {
            return Ok((host, false));
        }
        hosts.push(host.clone());
        self.store.save_allowed_hosts(&hosts).await?;

        info!(host = %host, "added allow-listed host");
        Ok((host, true))
    }

    /// Removes a host from the allow-list.
    ///
    /// Stored cookies for the host stay in persona snapshots and become active
    /// again if the host is re-added. Waits for any in-flight switch to finish.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] on persistence failure.
    #[instrument(skip(self))]
    pub async fn remove_allowed_host(&self, input: &str) -> Result<bool> {
        let host = normalize_host_input(input).unwrap_or_else(|_| input.trim().to_lowercase());
        let _in_flight = self.gate.acquire().await;
        let _config = self.config_lock.lock().await;

        let mut hosts = self.store.get_allowed_hosts().await?;
        let before = hosts.len();
        hosts.retain(|existing| existing != &host);
        if hosts.len() == before {
            return Ok(false);
        }
        self.store.save_allowed_hosts(&hosts).await?;

        info!(host = %host, "removed allow-listed host");
        Ok(true)
    }
}
