//! Persona switching: the cookie isolation engine.
//!
//! On every change of the active-persona pointer the coordinator:
//!
//! 1. reads the allow-list, and gives up when it is empty;
//! 2. takes the active tab's host as the scope, and gives up when there is
//!    none or the allow-list does not cover it;
//! 3. saves the outgoing persona's cookies for the scope host, merged with its
//!    stored cookies for every other host;
//! 4. clears cookies, local storage and cache for `https://<host>` and
//!    `http://<host>` only;
//! 5. restores the incoming persona's cookies for the scope host, sending a
//!    `domain` attribute only for domain cookies;
//! 6. publishes a completion signal.
//!
//! # Architecture
//!
//! - [`PersonaSwitchCoordinator`] - runs steps 1-5 for one event
//! - [`SwitchDispatcher`] - single-consumer queue feeding the coordinator, step 6
//! - [`SwitchGate`] - lock held for the whole of each switch
//! - [`merge_snapshot`] - merge-on-save that keeps one record per `(name, domain, path)`

mod coordinator;
mod dispatcher;
mod error;
mod snapshot;

pub use coordinator::{PersonaSwitchCoordinator, SwitchGate, resolve_scope_host, scoped_origins};
pub use dispatcher::{SwitchCompletion, SwitchDispatcher, SwitchNotifier};
pub use error::{CookieSetFailure, ScopeUnavailable, SwitchError, SwitchOutcome, SwitchReport};
pub use snapshot::{capture_for_host, dedupe_by_key, merge_snapshot};

/// A change of the active-persona pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchEvent {
    /// Persona that was active before the change.
    pub old: Option<String>,
    /// Persona that is active after the change.
    pub new: Option<String>,
}

impl SwitchEvent {
    /// Creates an event from the previous and current pointer values.
    #[must_use]
    pub fn new(old: Option<&str>, new: Option<&str>) -> Self {
        Self {
            old: old.map(str::to_string),
            new: new.map(str::to_string),
        }
    }
}
