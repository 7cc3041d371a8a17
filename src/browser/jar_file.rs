//! Browser jar persisted as a JSON file.
//!
//! The file holds a JSON array of cookies in the browser's `cookies.getAll`
//! shape. Lets the CLI drive persona switches against a jar exported from (or
//! destined for) a real browser profile.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{BrowserAgent, BrowserError, BrowsingDataKinds, MemoryBrowser, SetCookieError};
use crate::cookie::{CookieRecord, SetCookieRequest};

/// A [`MemoryBrowser`] loaded from and saved back to a jar file.
#[derive(Debug)]
pub struct JarFileBrowser {
    path: PathBuf,
    inner: MemoryBrowser,
}

impl JarFileBrowser {
    /// Loads the jar at `path` (empty when the file does not exist).
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the file cannot be read or is not a JSON
    /// cookie array.
    #[instrument(level = "debug", skip(path), fields(path = %path.display()))]
    pub fn open(path: &Path, active_tab_url: Option<&str>) -> Result<Self, BrowserError> {
        let cookies = if path.exists() {
            let raw = fs::read_to_string(path)?;
            if raw.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str::<Vec<CookieRecord>>(&raw)?
            }
        } else {
            Vec::new()
        };
        debug!(cookies = cookies.len(), "loaded cookie jar file");

        let mut inner = MemoryBrowser::new(cookies);
        if let Some(url) = active_tab_url {
            inner = inner.with_active_tab(url);
        }

        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    /// Returns the jar file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the in-memory browser state.
    #[must_use]
    pub fn browser(&self) -> &MemoryBrowser {
        &self.inner
    }

    /// Writes the current jar back to the file, readable by the owner only.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when encoding or writing fails.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub async fn persist(&self) -> Result<(), BrowserError> {
        let cookies = self.inner.cookies().await;
        let encoded = serde_json::to_string_pretty(&cookies)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, encoded)?;
        set_owner_only_permissions(&self.path)?;
        debug!(cookies = cookies.len(), "saved cookie jar file");
        Ok(())
    }
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> Result<(), BrowserError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = fs::Permissions::from_mode(0o600);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> Result<(), BrowserError> {
    Ok(())
}

#[async_trait]
impl BrowserAgent for JarFileBrowser {
    async fn active_tab_host(&self) -> Option<String> {
        self.inner.active_tab_host().await
    }

    async fn get_all_cookies(&self) -> Result<Vec<CookieRecord>, BrowserError> {
        self.inner.get_all_cookies().await
    }

    async fn clear_browsing_data(
        &self,
        origins: &[String],
        kinds: BrowsingDataKinds,
    ) -> Result<(), BrowserError> {
        self.inner.clear_browsing_data(origins, kinds).await
    }

    async fn set_cookie(&self, request: &SetCookieRequest) -> Result<CookieRecord, SetCookieError> {
        self.inner.set_cookie(request).await
    }
}
