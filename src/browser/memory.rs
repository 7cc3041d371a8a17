//! In-process browser jar.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use super::{BrowserAgent, BrowserError, BrowsingDataKinds, SetCookieError};
use crate::cookie::{CookieRecord, SetCookieRequest, is_cookie_domain_allowed, normalize_cookie_domain};
use crate::hosts::host_from_tab_url;

/// A clear request as received by [`MemoryBrowser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearRequest {
    pub origins: Vec<String>,
    pub kinds: BrowsingDataKinds,
}

#[derive(Debug, Default)]
struct JarState {
    active_tab_url: Option<String>,
    cookies: Vec<CookieRecord>,
    clear_requests: Vec<ClearRequest>,
    set_requests: Vec<SetCookieRequest>,
    rejected_names: HashSet<String>,
}

/// Cookie jar and active tab held in memory.
///
/// Follows the browser's rules where they matter for isolation: cookies are
/// keyed by `(name, domain, path)`, a set request without `domain` yields a
/// host-only cookie for the URL host, a request with `domain` yields a
/// dot-prefixed domain cookie, and clearing an origin removes every cookie
/// whose domain falls under the origin's host.
#[derive(Debug, Default)]
pub struct MemoryBrowser {
    state: Mutex<JarState>,
}

impl MemoryBrowser {
    /// Creates a browser whose jar holds `cookies` and that has no active tab.
    #[must_use]
    pub fn new(cookies: Vec<CookieRecord>) -> Self {
        Self {
            state: Mutex::new(JarState {
                cookies,
                ..JarState::default()
            }),
        }
    }

    /// Sets the active tab URL at construction time.
    #[must_use]
    pub fn with_active_tab(mut self, url: impl Into<String>) -> Self {
        self.state.get_mut().active_tab_url = Some(url.into());
        self
    }

    /// Changes (or clears) the active tab URL.
    pub async fn set_active_tab(&self, url: Option<&str>) {
        self.state.lock().await.active_tab_url = url.map(str::to_string);
    }

    /// Makes every subsequent set request for a cookie named `name` fail.
    pub async fn reject_cookie(&self, name: impl Into<String>) {
        self.state.lock().await.rejected_names.insert(name.into());
    }

    /// Returns the current jar contents.
    pub async fn cookies(&self) -> Vec<CookieRecord> {
        self.state.lock().await.cookies.clone()
    }

    /// Returns every clear request received, oldest first.
    pub async fn clear_requests(&self) -> Vec<ClearRequest> {
        self.state.lock().await.clear_requests.clone()
    }

    /// Returns every set request received, oldest first, including rejected ones.
    pub async fn set_requests(&self) -> Vec<SetCookieRequest> {
        self.state.lock().await.set_requests.clone()
    }
}

#[async_trait]
impl BrowserAgent for MemoryBrowser {
    async fn active_tab_host(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.active_tab_url.as_deref().and_then(host_from_tab_url)
    }

    async fn get_all_cookies(&self) -> Result<Vec<CookieRecord>, BrowserError> {
        Ok(self.cookies().await)
    }

    async fn clear_browsing_data(
        &self,
        origins: &[String],
        kinds: BrowsingDataKinds,
    ) -> Result<(), BrowserError> {
        let hosts = origins
            .iter()
            .map(|origin| {
                host_from_tab_url(origin).ok_or_else(|| BrowserError::InvalidOrigin(origin.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = self.state.lock().await;
        if kinds.cookies {
            let before = state.cookies.len();
            state
                .cookies
                .retain(|cookie| !is_cookie_domain_allowed(&cookie.domain, &hosts));
            debug!(
                removed = before - state.cookies.len(),
                "cleared cookies for origins"
            );
        }
        state.clear_requests.push(ClearRequest {
            origins: origins.to_vec(),
            kinds,
        });
        Ok(())
    }

    async fn set_cookie(&self, request: &SetCookieRequest) -> Result<CookieRecord, SetCookieError> {
        let mut state = self.state.lock().await;
        state.set_requests.push(request.clone());

        let invalid_url = || SetCookieError::InvalidUrl {
            url: request.url.clone(),
        };
        let url = Url::parse(&request.url).map_err(|_| invalid_url())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid_url());
        }
        let host = host_from_tab_url(&request.url).ok_or_else(invalid_url)?;

        if state.rejected_names.contains(&request.name) {
            return Err(SetCookieError::Rejected {
                name: request.name.clone(),
                reason: "blocked by browser policy".to_string(),
            });
        }
        if request.secure && url.scheme() != "https" {
            return Err(SetCookieError::Rejected {
                name: request.name.clone(),
                reason: "secure cookies require an https URL".to_string(),
            });
        }

        let (domain, host_only) = match request.domain.as_deref() {
            Some(domain) => {
                let bare = normalize_cookie_domain(domain).to_ascii_lowercase();
                if !is_cookie_domain_allowed(&host, &[bare.as_str()]) {
                    return Err(SetCookieError::DomainMismatch {
                        domain: domain.to_string(),
                        host,
                    });
                }
                (format!(".{bare}"), false)
            }
            None => (host, true),
        };

        let mut record = CookieRecord::new(request.name.clone(), request.value(), domain);
        record.host_only = host_only;
        record.path = request.path.clone();
        record.secure = request.secure;
        record.http_only = request.http_only;
        record.same_site = request.same_site;
        record.expiration_date = request.expiration_date;
        record.store_id = request.store_id.clone();

        if let Some(existing) = state
            .cookies
            .iter_mut()
            .find(|cookie| cookie.key() == record.key())
        {
            *existing = record.clone();
        } else {
            state.cookies.push(record.clone());
        }

        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_active_tab_host_from_url() {
        let browser = MemoryBrowser::default().with_active_tab("https://Example.com/home");
        assert_eq!(browser.active_tab_host().await.as_deref(), Some("example.com"));

        browser.set_active_tab(None).await;
        assert_eq!(browser.active_tab_host().await, None);
    }

    #[tokio::test]
    async fn test_set_without_domain_creates_host_only_cookie() {
        let browser = MemoryBrowser::default();
        let request = SetCookieRequest::from_record(&CookieRecord::new("a", "1", "sub.example.com"));
        let stored = browser.set_cookie(&request).await.unwrap();

        assert!(stored.host_only);
        assert_eq!(stored.domain, "sub.example.com");
    }

    #[tokio::test]
    async fn test_set_with_domain_creates_domain_cookie() {
        let browser = MemoryBrowser::default();
        let request = SetCookieRequest::from_record(&CookieRecord::new("a", "1", ".example.com"));
        let stored = browser.set_cookie(&request).await.unwrap();

        assert!(!stored.host_only);
        assert_eq!(stored.domain, ".example.com");
    }

    #[tokio::test]
    async fn test_set_replaces_cookie_with_same_key() {
        let browser = MemoryBrowser::default();
        let mut cookie = CookieRecord::new("a", "1", ".example.com");
        browser
            .set_cookie(&SetCookieRequest::from_record(&cookie))
            .await
            .unwrap();
        cookie.set_value("2");
        browser
            .set_cookie(&SetCookieRequest::from_record(&cookie))
            .await
            .unwrap();

        let jar = browser.cookies().await;
        assert_eq!(jar.len(), 1);
        assert_eq!(jar[0].value(), "2");
    }

    #[tokio::test]
    async fn test_set_with_foreign_domain_rejected() {
        let browser = MemoryBrowser::default();
        let mut request = SetCookieRequest::from_record(&CookieRecord::new("a", "1", "example.com"));
        request.domain = Some(".other.com".to_string());

        let result = browser.set_cookie(&request).await;
        assert!(matches!(result, Err(SetCookieError::DomainMismatch { .. })));
        assert!(browser.cookies().await.is_empty());
    }

    #[tokio::test]
    async fn test_secure_cookie_over_http_rejected() {
        let browser = MemoryBrowser::default();
        let mut request = SetCookieRequest::from_record(&CookieRecord::new("a", "1", "example.com"));
        request.secure = true;

        let result = browser.set_cookie(&request).await;
        assert!(matches!(result, Err(SetCookieError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_rejected_name_fails() {
        let browser = MemoryBrowser::default();
        browser.reject_cookie("bad").await;
        let request = SetCookieRequest::from_record(&CookieRecord::new("bad", "1", "example.com"));

        assert!(browser.set_cookie(&request).await.is_err());
        assert_eq!(browser.set_requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_only_cookies_under_origin_host() {
        let browser = MemoryBrowser::new(vec![
            CookieRecord::new("a", "1", ".example.com"),
            CookieRecord::new("b", "2", "sub.example.com"),
            CookieRecord::new("c", "3", ".other.com"),
        ]);
        let origins = vec![
            "https://example.com".to_string(),
            "http://example.com".to_string(),
        ];

        browser
            .clear_browsing_data(&origins, BrowsingDataKinds::isolation())
            .await
            .unwrap();

        let names: Vec<String> = browser.cookies().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["c".to_string()]);
        assert_eq!(browser.clear_requests().await[0].origins, origins);
    }

    #[tokio::test]
    async fn test_clear_with_invalid_origin_errors() {
        let browser = MemoryBrowser::default();
        let result = browser
            .clear_browsing_data(&["nonsense".to_string()], BrowsingDataKinds::isolation())
            .await;
        assert!(matches!(result, Err(BrowserError::InvalidOrigin(_))));
    }
}
