//! Outcome and error types for persona switches.

use std::fmt;

use thiserror::Error;

use crate::browser::{BrowserError, SetCookieError};
use crate::store::StoreError;

/// Why isolation did not apply to a switch. A normal outcome, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeUnavailable {
    /// The allow-list is empty.
    NoAllowedHosts,
    /// There is no active tab or its URL has no parseable host.
    NoActiveHost,
    /// The active tab's host is not covered by the allow-list.
    HostNotAllowed {
        /// Host of the active tab.
        host: String,
    },
}

impl fmt::Display for ScopeUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAllowedHosts => write!(f, "no allow-listed hosts configured"),
            Self::NoActiveHost => write!(f, "active tab host unavailable"),
            Self::HostNotAllowed { host } => write!(f, "active host '{host}' is not allow-listed"),
        }
    }
}

/// A cookie that could not be restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSetFailure {
    /// Cookie name.
    pub name: String,
    /// Host the cookie was set against.
    pub host: String,
    /// Browser-reported failure.
    pub error: SetCookieError,
}

/// What a completed switch did for its scope host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReport {
    /// The single host the switch was scoped to.
    pub host: String,
    /// Cookies captured for the outgoing persona; `None` when there was none.
    pub saved: Option<usize>,
    /// Cookies restored for the incoming persona.
    pub restored: usize,
    /// Cookies the browser refused to set.
    pub failures: Vec<CookieSetFailure>,
}

impl SwitchReport {
    /// Returns `true` when every restore succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of processing one switch event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Isolation did not apply; nothing was saved, cleared or restored.
    Skipped(ScopeUnavailable),
    /// Save, clear and restore ran for the scope host.
    Completed(SwitchReport),
}

/// Boundary failures that abort a single switch.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Reading or writing persisted state failed.
    #[error("persona switch aborted: {0}")]
    Store(#[from] StoreError),

    /// Reading the cookie jar or clearing browsing data failed.
    #[error("persona switch aborted: {0}")]
    Browser(#[from] BrowserError),

    /// The dispatcher is no longer accepting events.
    #[error("persona switch dispatcher has shut down")]
    DispatcherClosed,
}
