//! Corrupted databases and state rows must fail loudly without touching the browser.

use std::sync::Arc;

use alterego_core::{
    Database, KeyValueStore, MemoryBrowser, MemoryStore, StateStore, StoreError, SwitchError,
    SwitchEvent, store::cookies_key,
};

use crate::support::{corrupted_database, coordinator, domain_cookie, store_with_personas};

#[tokio::test]
async fn p0_corrupted_database_file_fails_to_open() {
    let (_temp_dir, db_path) = corrupted_database();
    let result = Database::new(&db_path).await;
    assert!(result.is_err(), "garbage file must not open as a state db");
}

#[tokio::test]
async fn p0_corrupt_row_names_its_key() {
    let store = MemoryStore::new();
    store
        .set_raw("allowedHosts", "{not json".to_string())
        .await
        .unwrap();

    let err = store.get_allowed_hosts().await.unwrap_err();
    assert!(matches!(&err, StoreError::Corrupt { key, .. } if key == "allowedHosts"));
}

#[tokio::test]
async fn p0_corrupt_snapshot_aborts_switch_before_clearing() {
    let store = store_with_personas(&["example.com"]).await;
    store
        .set_raw(&cookies_key("A"), "[{\"name\":".to_string())
        .await
        .unwrap();
    let browser = Arc::new(
        MemoryBrowser::new(vec![domain_cookie("sid", "a", ".example.com")])
            .with_active_tab("https://example.com/"),
    );

    let result = coordinator(&store, &browser)
        .run_switch(&SwitchEvent::new(Some("A"), Some("B")))
        .await;

    assert!(matches!(result, Err(SwitchError::Store(StoreError::Corrupt { .. }))));
    assert!(browser.clear_requests().await.is_empty());
    assert_eq!(browser.cookies().await.len(), 1);
}

#[tokio::test]
async fn p0_unknown_same_site_is_dropped_not_fatal() {
    let store = Arc::new(MemoryStore::new());
    store
        .set_raw(
            &cookies_key("A"),
            r#"[{"name":"sid","value":"1","domain":".example.com","path":"/","secure":false,"httpOnly":false,"sameSite":"unspecified","hostOnly":false}]"#
                .to_string(),
        )
        .await
        .unwrap();

    let cookies = store.get_cookies("A").await.unwrap();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].same_site, None);
}
