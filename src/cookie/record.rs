//! Cookie records as captured from, stored for, and restored into the browser.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{is_cookie_domain_allowed, normalize_cookie_domain};

/// Cross-site send policy of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    Strict,
    Lax,
    NoRestriction,
}

impl SameSite {
    /// Returns the browser's label for this policy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lax => "lax",
            Self::NoRestriction => "no_restriction",
        }
    }

    /// Normalizes a label reported by a browser or found in stored data.
    ///
    /// Matching is case-insensitive and `none` is accepted as an alias of
    /// `no_restriction`. `unspecified` and unknown labels yield `None`, which
    /// means "send no `sameSite` attribute".
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "lax" => Some(Self::Lax),
            "no_restriction" | "none" => Some(Self::NoRestriction),
            _ => None,
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn deserialize_same_site<'de, D>(deserializer: D) -> Result<Option<SameSite>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(SameSite::parse_lenient))
}

/// Identity of a cookie inside a jar or snapshot: `(name, domain, path)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CookieKey<'a> {
    pub name: &'a str,
    pub domain: &'a str,
    pub path: &'a str,
}

/// A single browser cookie.
///
/// Field names serialize in the browser's camelCase shape so stored snapshots
/// can be fed straight back from `cookies.getAll`-style output. The value is
/// redacted in `Debug` output.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    /// Cookie name.
    pub name: String,
    /// Cookie value (sensitive, never log).
    value: String,
    /// Domain, dot-prefixed for domain cookies.
    pub domain: String,
    /// URL path scope.
    #[serde(default = "default_path")]
    pub path: String,
    /// Only sent over HTTPS.
    #[serde(default)]
    pub secure: bool,
    /// Hidden from page scripts.
    #[serde(default)]
    pub http_only: bool,
    /// Cross-site policy; `None` when the browser reported none we accept.
    #[serde(
        default,
        deserialize_with = "deserialize_same_site",
        skip_serializing_if = "Option::is_none"
    )]
    pub same_site: Option<SameSite>,
    /// Set without a `Domain` attribute; scoped to exactly `domain`.
    #[serde(default)]
    pub host_only: bool,
    /// Expiry in epoch seconds; `None` for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    /// Browser cookie store the cookie lives in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

impl CookieRecord {
    /// Creates a session cookie at `/`.
    ///
    /// A domain without a leading dot produces a host-only cookie, a
    /// dot-prefixed domain produces a domain cookie.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        let host_only = !domain.starts_with('.');
        Self {
            name: name.into(),
            value: value.into(),
            domain,
            path: default_path(),
            secure: false,
            http_only: false,
            same_site: None,
            host_only,
            expiration_date: None,
            store_id: None,
        }
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive. Avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the cookie value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Returns the `(name, domain, path)` identity of this cookie.
    #[must_use]
    pub fn key(&self) -> CookieKey<'_> {
        CookieKey {
            name: &self.name,
            domain: &self.domain,
            path: &self.path,
        }
    }

    /// Returns the domain without its leading dot.
    #[must_use]
    pub fn bare_domain(&self) -> &str {
        normalize_cookie_domain(&self.domain)
    }

    /// Returns `true` when this cookie belongs to `host` or one of its subdomains.
    #[must_use]
    pub fn belongs_to(&self, host: &str) -> bool {
        is_cookie_domain_allowed(&self.domain, &[host])
    }
}

impl fmt::Debug for CookieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieRecord")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("same_site", &self.same_site)
            .field("host_only", &self.host_only)
            .field("expiration_date", &self.expiration_date)
            .field("store_id", &self.store_id)
            .finish()
    }
}
