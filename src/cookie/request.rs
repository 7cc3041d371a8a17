//! Reconstruction of browser set-cookie requests from stored records.

use std::fmt;

use serde::Serialize;

use super::record::{CookieRecord, SameSite};

/// A request for the browser's cookie-set primitive.
///
/// The browser derives the cookie's host from `url`. `domain` is present only
/// for domain cookies: sending it for a host-only cookie would turn it into a
/// domain cookie with a different identity in the jar.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookieRequest {
    pub url: String,
    pub name: String,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

impl SetCookieRequest {
    /// Builds the set request that recreates `record` in the browser.
    #[must_use]
    pub fn from_record(record: &CookieRecord) -> Self {
        let domain = if record.host_only {
            None
        } else {
            Some(record.domain.clone())
        };

        Self {
            url: build_origin_url(record),
            name: record.name.clone(),
            value: record.value().to_string(),
            domain,
            path: record.path.clone(),
            secure: record.secure,
            http_only: record.http_only,
            expiration_date: record.expiration_date,
            store_id: record.store_id.clone(),
            same_site: record.same_site,
        }
    }

    /// Returns the cookie value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for SetCookieRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetCookieRequest")
            .field("url", &self.url)
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("expiration_date", &self.expiration_date)
            .field("store_id", &self.store_id)
            .field("same_site", &self.same_site)
            .finish()
    }
}

/// Builds the URL a cookie is set against.
///
/// Uses `https://` for secure cookies and `http://` otherwise, and strips the
/// leading dot from the domain.
#[must_use]
pub fn build_origin_url(record: &CookieRecord) -> String {
    let scheme = if record.secure { "https" } else { "http" };
    let host = record.bare_domain();
    if record.path.starts_with('/') {
        format!("{scheme}://{host}{}", record.path)
    } else {
        format!("{scheme}://{host}/{}", record.path)
    }
}
