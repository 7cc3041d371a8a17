//! Hostname extraction and allow-list input normalization.

use thiserror::Error;
use tracing::debug;
use url::{Host, Url};

/// Reasons a hostname cannot be added to the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Input was blank.
    #[error("hostname cannot be empty")]
    Empty,
    /// Input could not be read as a hostname or http(s) URL.
    #[error("'{input}' is not a valid hostname")]
    Invalid {
        /// The rejected input.
        input: String,
    },
    /// URL used a scheme other than http/https.
    #[error("unsupported scheme '{scheme}' (only http and https hosts can be isolated)")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },
}

/// Extracts the lowercase hostname from the active tab's URL.
///
/// A trailing root dot is dropped, so `example.com.` matches `example.com`.
/// Returns `None` for unparseable URLs and for URLs without a host
/// (`about:blank`, `file://`). IP literals are returned as-is.
#[must_use]
pub fn host_from_tab_url(tab_url: &str) -> Option<String> {
    let parsed = match Url::parse(tab_url) {
        Ok(parsed) => parsed,
        Err(error) => {
            debug!(error = %error, "active tab URL is not parseable");
            return None;
        }
    };

    match parsed.host()? {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.');
            (!domain.is_empty()).then(|| domain.to_ascii_lowercase())
        }
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(format!("[{addr}]")),
    }
}

/// Normalizes user input into an allow-list hostname.
///
/// Accepts a bare host (`Example.COM`) or an http(s) URL
/// (`https://example.com/login`). The result is lowercase with no scheme,
/// port or path.
///
/// # Errors
///
/// Returns [`HostError`] for blank input, unsupported schemes, or input that
/// does not contain a hostname.
pub fn normalize_host_input(input: &str) -> Result<String, HostError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(HostError::Empty);
    }

    let invalid = || HostError::Invalid {
        input: trimmed.to_string(),
    };

    if trimmed.contains("://") {
        let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HostError::UnsupportedScheme {
                scheme: parsed.scheme().to_string(),
            });
        }
        return host_from_tab_url(trimmed).ok_or_else(invalid);
    }

    if trimmed.contains(['/', ':', '?', '#', '@']) || trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let parsed = Url::parse(&format!("http://{trimmed}/")).map_err(|_| invalid())?;
    match parsed.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => {
            Ok(domain.trim_end_matches('.').to_ascii_lowercase())
        }
        Some(Host::Ipv4(addr)) => Ok(addr.to_string()),
        _ => Err(invalid()),
    }
}
