//! The host browser's cookie and browsing-data primitives.
//!
//! - [`BrowserAgent`] - async boundary the switch coordinator drives
//! - [`MemoryBrowser`] - in-process jar with browser set/clear semantics
//! - [`JarFileBrowser`] - [`MemoryBrowser`] persisted to a JSON file

mod error;
mod jar_file;
mod memory;

pub use error::{BrowserError, SetCookieError};
pub use jar_file::JarFileBrowser;
pub use memory::{ClearRequest, MemoryBrowser};

use async_trait::async_trait;

use crate::cookie::{CookieRecord, SetCookieRequest};

/// Kinds of browsing data removed by a clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowsingDataKinds {
    pub cookies: bool,
    pub local_storage: bool,
    pub cache: bool,
}

impl BrowsingDataKinds {
    /// Everything a persona switch wipes for the scope host.
    #[must_use]
    pub const fn isolation() -> Self {
        Self {
            cookies: true,
            local_storage: true,
            cache: true,
        }
    }
}

/// Browser primitives consumed by the switch coordinator.
#[async_trait]
pub trait BrowserAgent: Send + Sync {
    /// Lowercase hostname of the active tab; `None` when there is no active
    /// tab or its URL has no parseable host.
    async fn active_tab_host(&self) -> Option<String>;

    /// Returns every cookie currently in the jar.
    async fn get_all_cookies(&self) -> Result<Vec<CookieRecord>, BrowserError>;

    /// Removes browsing data for exactly the given origins.
    async fn clear_browsing_data(
        &self,
        origins: &[String],
        kinds: BrowsingDataKinds,
    ) -> Result<(), BrowserError>;

    /// Sets one cookie, returning the cookie as the browser stored it.
    async fn set_cookie(&self, request: &SetCookieRequest) -> Result<CookieRecord, SetCookieError>;
}
