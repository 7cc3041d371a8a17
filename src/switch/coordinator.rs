//! The persona-switch sequence: resolve scope, save, clear, restore.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

use super::error::{CookieSetFailure, ScopeUnavailable, SwitchError, SwitchOutcome, SwitchReport};
use super::snapshot::{capture_for_host, merge_snapshot};
use super::SwitchEvent;
use crate::browser::{BrowserAgent, BrowsingDataKinds};
use crate::cookie::{SetCookieRequest, is_cookie_domain_allowed};
use crate::persona::Persona;
use crate::store::StateStore;

/// Serializes persona switches against each other and against deletions of
/// personas or allow-listed hosts.
#[derive(Debug, Clone, Default)]
pub struct SwitchGate(Arc<Mutex<()>>);

impl SwitchGate {
    /// Creates an unlocked gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no switch (or guarded deletion) is in flight.
    pub async fn acquire(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.0).lock_owned().await
    }
}

/// Returns the two origins a switch clears for `host`.
#[must_use]
pub fn scoped_origins(host: &str) -> Vec<String> {
    vec![format!("https://{host}"), format!("http://{host}")]
}

/// Picks the scope host for a switch.
///
/// The scope is the active tab's host, and only when the allow-list covers it.
///
/// # Errors
///
/// Returns the [`ScopeUnavailable`] reason when isolation does not apply.
pub fn resolve_scope_host(
    allowed_hosts: &[String],
    active_host: Option<String>,
) -> Result<String, ScopeUnavailable> {
    if allowed_hosts.is_empty() {
        return Err(ScopeUnavailable::NoAllowedHosts);
    }
    let host = active_host.ok_or(ScopeUnavailable::NoActiveHost)?;
    if !is_cookie_domain_allowed(&host, allowed_hosts) {
        return Err(ScopeUnavailable::HostNotAllowed { host });
    }
    Ok(host)
}

/// Returns `persona_id` when it still names a stored persona.
fn live_persona<'a>(
    personas: &[Persona],
    persona_id: Option<&'a str>,
    role: &'static str,
) -> Option<&'a str> {
    let id = persona_id?;
    if personas.iter().any(|persona| persona.id == id) {
        Some(id)
    } else {
        info!(persona = id, role, "persona was deleted before its switch ran");
        None
    }
}

/// Makes the active tab's allow-listed host hold the incoming persona's
/// cookies while preserving the outgoing persona's cookies for it.
pub struct PersonaSwitchCoordinator {
    store: Arc<dyn StateStore>,
    browser: Arc<dyn BrowserAgent>,
    gate: SwitchGate,
}

impl PersonaSwitchCoordinator {
    /// Creates a coordinator with its own gate.
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>, browser: Arc<dyn BrowserAgent>) -> Self {
        Self::with_gate(store, browser, SwitchGate::new())
    }

    /// Creates a coordinator that shares `gate` with other writers.
    #[must_use]
    pub fn with_gate(
        store: Arc<dyn StateStore>,
        browser: Arc<dyn BrowserAgent>,
        gate: SwitchGate,
    ) -> Self {
        Self {
            store,
            browser,
            gate,
        }
    }

    /// Returns the gate held for the duration of each switch.
    #[must_use]
    pub fn gate(&self) -> SwitchGate {
        self.gate.clone()
    }

    /// Runs the full switch sequence for one change of the active persona.
    ///
    /// Holds the switch gate throughout, so concurrent calls run one after the
    /// other. A persona named by the event that no longer exists is neither
    /// saved nor restored; the scope host is still cleared.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError`] when persisted state or a bulk browser
    /// operation fails. Scope that cannot be resolved and individual cookies
    /// that cannot be set are reported in the returned [`SwitchOutcome`].
    #[instrument(skip(self, event), fields(old = ?event.old, new = ?event.new))]
    pub async fn run_switch(&self, event: &SwitchEvent) -> Result<SwitchOutcome, SwitchError> {
        let _in_flight = self.gate.acquire().await;
        info!("switching persona");

        let allowed_hosts = self.store.get_allowed_hosts().await?;
        let active_host = if allowed_hosts.is_empty() {
            None
        } else {
            self.browser.active_tab_host().await
        };

        let host = match resolve_scope_host(&allowed_hosts, active_host) {
            Ok(host) => host,
            Err(reason) => {
                info!(reason = %reason, "cookie isolation not applicable; skipping switch");
                return Ok(SwitchOutcome::Skipped(reason));
            }
        };

        // Events queued before a deletion must not resurrect its snapshot.
        let personas = self.store.get_personas().await?;
        let outgoing = live_persona(&personas, event.old.as_deref(), "outgoing");
        let incoming = live_persona(&personas, event.new.as_deref(), "incoming");

        let saved = match outgoing {
            Some(old) => Some(self.save_outgoing(old, &host).await?),
            None => None,
        };

        self.clear_scope(&host).await?;

        let (restored, failures) = match incoming {
            Some(new) => self.restore_incoming(new, &host).await?,
            None => (0, Vec::new()),
        };

        info!(
            host = %host,
            saved = ?saved,
            restored,
            failed = failures.len(),
            "persona switch complete"
        );

        Ok(SwitchOutcome::Completed(SwitchReport {
            host,
            saved,
            restored,
            failures,
        }))
    }

    async fn save_outgoing(&self, persona_id: &str, host: &str) -> Result<usize, SwitchError> {
        let jar = self.browser.get_all_cookies().await?;
        let captured = capture_for_host(jar, host);
        let captured_count = captured.len();

        let stored = self.store.get_cookies(persona_id).await?;
        let merged = merge_snapshot(stored, captured, host);
        self.store.save_cookies(persona_id, &merged).await?;

        info!(
            persona = persona_id,
            host,
            captured = captured_count,
            total = merged.len(),
            "saved outgoing persona cookies"
        );
        Ok(captured_count)
    }

    async fn clear_scope(&self, host: &str) -> Result<(), SwitchError> {
        let origins = scoped_origins(host);
        self.browser
            .clear_browsing_data(&origins, BrowsingDataKinds::isolation())
            .await?;
        info!(?origins, "cleared browsing data for scope host");
        Ok(())
    }

    async fn restore_incoming(
        &self,
        persona_id: &str,
        host: &str,
    ) -> Result<(usize, Vec<CookieSetFailure>), SwitchError> {
        let stored = self.store.get_cookies(persona_id).await?;
        let total = stored.len();
        let to_restore: Vec<_> = stored
            .into_iter()
            .filter(|cookie| cookie.belongs_to(host))
            .collect();
        info!(
            persona = persona_id,
            host,
            restoring = to_restore.len(),
            stored = total,
            "restoring incoming persona cookies"
        );

        let mut restored = 0;
        let mut failures = Vec::new();
        for cookie in &to_restore {
            let request = SetCookieRequest::from_record(cookie);
            match self.browser.set_cookie(&request).await {
                Ok(_) => {
                    restored += 1;
                    debug!(
                        name = %cookie.name,
                        domain = %cookie.domain,
                        host_only = cookie.host_only,
                        "restored cookie"
                    );
                }
                Err(error) => {
                    warn!(
                        name = %cookie.name,
                        host = %cookie.bare_domain(),
                        error = %error,
                        "failed to restore cookie"
                    );
                    failures.push(CookieSetFailure {
                        name: cookie.name.clone(),
                        host: cookie.bare_domain().to_string(),
                        error,
                    });
                }
            }
        }

        Ok((restored, failures))
    }
}
