//! Re-open state after a normal close; verify personas, snapshots and jars persist.

use std::sync::Arc;

use alterego_core::{
    BrowserAgent, Database, JarFileBrowser, PersonaRegistry, SqliteStore, StateStore,
};
use tempfile::TempDir;

use crate::support::{domain_cookie, host_cookie, rich_cookie, sorted};

#[tokio::test]
async fn p0_personas_persist_after_reopen() {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("persist.db");

    let id = {
        let db = Database::new(&db_path).await.expect("create db");
        let registry = PersonaRegistry::new(Arc::new(SqliteStore::new(db)));
        let persona = registry.create_persona("Work").await.expect("create");
        registry
            .select_persona(Some(&persona.id))
            .await
            .expect("select");
        persona.id
    };

    let db = Database::new(&db_path).await.expect("reopen db");
    let registry = PersonaRegistry::new(Arc::new(SqliteStore::new(db)));
    let active = registry
        .active_persona()
        .await
        .expect("read")
        .expect("active persona still set");
    assert_eq!(active.id, id);
    assert_eq!(active.name, "Work");
}

#[tokio::test]
async fn p0_wal_mode_after_reopen() {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("wal.db");

    let db = Database::new(&db_path).await.expect("create db");
    let wal1 = db.is_wal_enabled().await.expect("pragma");
    db.close().await;

    let db = Database::new(&db_path).await.expect("reopen db");
    let wal2 = db.is_wal_enabled().await.expect("pragma");
    assert!(wal1 && wal2, "WAL should remain enabled after reopen");
}

#[tokio::test]
async fn p0_jar_file_round_trips_cookie_attributes() {
    let temp_dir = TempDir::new().expect("temp dir");
    let jar_path = temp_dir.path().join("profile").join("cookies.json");
    let cookies = vec![
        rich_cookie("auth", "token", ".example.com"),
        host_cookie("pref", "dark", "example.com"),
    ];

    let jar = JarFileBrowser::open(&jar_path, None).expect("open missing jar");
    for cookie in &cookies {
        jar.set_cookie(&alterego_core::SetCookieRequest::from_record(cookie))
            .await
            .expect("set cookie");
    }
    jar.persist().await.expect("persist jar");

    let reopened = JarFileBrowser::open(&jar_path, None).expect("reopen jar");
    assert_eq!(
        sorted(reopened.get_all_cookies().await.expect("read jar")),
        sorted(cookies)
    );
}

#[tokio::test]
async fn p1_snapshot_rewrite_is_last_write_wins() {
    let temp_dir = TempDir::new().expect("temp dir");
    let db = Database::new(&temp_dir.path().join("lww.db"))
        .await
        .expect("create db");
    let store = SqliteStore::new(db);

    store
        .save_cookies("A", &[domain_cookie("sid", "old", ".example.com")])
        .await
        .expect("first save");
    store
        .save_cookies("A", &[domain_cookie("sid", "new", ".example.com")])
        .await
        .expect("second save");

    let cookies = store.get_cookies("A").await.expect("read");
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value(), "new");
}
