//! Shared fixtures for integration tests: seeded stores, browsers and cookies.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use alterego_core::{
    CookieRecord, MemoryBrowser, MemoryStore, Persona, PersonaSwitchCoordinator, SameSite,
    StateStore,
};
use tempfile::TempDir;

/// Returns an owned host list.
pub fn hosts(list: &[&str]) -> Vec<String> {
    list.iter().map(|host| (*host).to_string()).collect()
}

/// A domain cookie (`Domain` attribute set) for `domain`, which must start with a dot.
pub fn domain_cookie(name: &str, value: &str, domain: &str) -> CookieRecord {
    assert!(domain.starts_with('.'), "domain cookies carry a leading dot");
    CookieRecord::new(name, value, domain)
}

/// A host-only cookie scoped to exactly `host`.
pub fn host_cookie(name: &str, value: &str, host: &str) -> CookieRecord {
    assert!(!host.starts_with('.'), "host-only cookies have no leading dot");
    CookieRecord::new(name, value, host)
}

/// A secure, http-only, lax session cookie with an expiry and store id.
pub fn rich_cookie(name: &str, value: &str, domain: &str) -> CookieRecord {
    let mut cookie = CookieRecord::new(name, value, domain);
    cookie.secure = true;
    cookie.http_only = true;
    cookie.same_site = Some(SameSite::Lax);
    cookie.expiration_date = Some(1_900_000_000.0);
    cookie.store_id = Some("0".to_string());
    cookie.path = "/app".to_string();
    cookie
}

/// Memory store with `allowed` already allow-listed.
pub async fn store_with_hosts(allowed: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    if !allowed.is_empty() {
        store
            .save_allowed_hosts(&hosts(allowed))
            .await
            .expect("seed allow-list");
    }
    store
}

/// Personas with the short ids `A`, `B` and `C` used by switch fixtures.
pub fn fixture_personas() -> Vec<Persona> {
    ["A", "B", "C"]
        .into_iter()
        .map(|id| Persona {
            id: id.to_string(),
            name: format!("Persona {id}"),
            created: 0,
        })
        .collect()
}

/// Memory store with `allowed` allow-listed and the fixture personas saved.
pub async fn store_with_personas(allowed: &[&str]) -> Arc<MemoryStore> {
    let store = store_with_hosts(allowed).await;
    store
        .save_personas(&fixture_personas())
        .await
        .expect("seed personas");
    store
}

/// Coordinator over the given collaborators.
pub fn coordinator(
    store: &Arc<MemoryStore>,
    browser: &Arc<MemoryBrowser>,
) -> PersonaSwitchCoordinator {
    let store: Arc<dyn StateStore> = store.clone();
    PersonaSwitchCoordinator::new(store, browser.clone())
}

/// Cookies sorted by `(name, domain, path)` for order-insensitive comparison.
pub fn sorted(mut cookies: Vec<CookieRecord>) -> Vec<CookieRecord> {
    cookies.sort_by(|a, b| {
        (&a.name, &a.domain, &a.path).cmp(&(&b.name, &b.domain, &b.path))
    });
    cookies
}

/// Asserts no two records share `(name, domain, path)`.
pub fn assert_unique_keys(cookies: &[CookieRecord]) {
    let keys: HashSet<_> = cookies.iter().map(CookieRecord::key).collect();
    assert_eq!(
        keys.len(),
        cookies.len(),
        "duplicate (name, domain, path) in {cookies:?}"
    );
}

/// Creates a file that exists but is not a valid `SQLite` database.
///
/// Keep the returned `TempDir` alive for as long as the path is used.
pub fn corrupted_database() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("corrupted.db");
    std::fs::write(&db_path, b"not a valid sqlite file\x00\x00\x00")
        .expect("Failed to write corrupted db file");
    (temp_dir, db_path)
}
