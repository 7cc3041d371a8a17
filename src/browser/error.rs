//! Error types for browser boundary operations.

use thiserror::Error;

/// Errors from bulk browser operations (reading the jar, clearing data).
#[derive(Debug, Error)]
pub enum BrowserError {
    /// A clear request named an origin the browser cannot scope to.
    #[error("invalid origin for browsing-data removal: '{0}'")]
    InvalidOrigin(String),

    /// Reading or writing a jar file failed.
    #[error("cookie jar file error: {0}")]
    Io(#[from] std::io::Error),

    /// A jar file does not contain valid cookie JSON.
    #[error("cookie jar file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why the browser refused to set a single cookie.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetCookieError {
    /// The request URL is not a usable http(s) URL.
    #[error("invalid cookie URL '{url}'")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// The `domain` attribute does not cover the URL host.
    #[error("cookie domain '{domain}' does not cover host '{host}'")]
    DomainMismatch {
        /// Requested domain attribute.
        domain: String,
        /// Host taken from the URL.
        host: String,
    },

    /// The browser rejected the cookie for another reason.
    #[error("cookie '{name}' rejected: {reason}")]
    Rejected {
        /// Cookie name.
        name: String,
        /// Browser-reported reason.
        reason: String,
    },
}
