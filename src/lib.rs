//! `AlterEgo` Core Library
//!
//! Per-site cookie isolation between browser personas. Each persona keeps its
//! own cookie snapshot; switching the active persona swaps the cookies of the
//! active tab's allow-listed host and leaves every other site alone.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`cookie`] - cookie records, domain matching, set-cookie requests
//! - [`hosts`] - tab-URL and allow-list host normalization
//! - [`persona`] - persona records, name rules, the persona registry
//! - [`store`] - persisted state behind the [`StateStore`] boundary
//! - [`db`] - `SQLite` connection and schema management for [`SqliteStore`]
//! - [`browser`] - the cookie jar behind the [`BrowserAgent`] boundary
//! - [`switch`] - the persona switch coordinator and its dispatcher

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod cookie;
pub mod db;
pub mod hosts;
pub mod persona;
pub mod store;
pub mod switch;

// Re-export commonly used types
pub use browser::{
    BrowserAgent, BrowserError, BrowsingDataKinds, JarFileBrowser, MemoryBrowser, SetCookieError,
};
pub use cookie::{
    CookieRecord, SameSite, SetCookieRequest, is_cookie_domain_allowed, normalize_cookie_domain,
};
pub use db::{Database, DbError};
pub use hosts::{HostError, host_from_tab_url, normalize_host_input};
pub use persona::{Persona, PersonaNameError, PersonaRegistry, RegistryError};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StateStore, StoreError};
pub use switch::{
    PersonaSwitchCoordinator, ScopeUnavailable, SwitchCompletion, SwitchDispatcher, SwitchError,
    SwitchEvent, SwitchGate, SwitchNotifier, SwitchOutcome, SwitchReport,
};
