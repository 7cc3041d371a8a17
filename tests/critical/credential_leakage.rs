//! Cookie values must never surface in Debug output, reports or error messages.

use std::sync::Arc;

use alterego_core::{
    JarFileBrowser, MemoryBrowser, SetCookieRequest, StateStore, SwitchEvent, SwitchOutcome,
};
use tempfile::TempDir;

use crate::support::{coordinator, domain_cookie, rich_cookie, store_with_personas};

const SECRET: &str = "s3cr3t-session-token";

#[test]
fn p0_cookie_debug_redacts_value() {
    let cookie = rich_cookie("auth", SECRET, ".example.com");
    let request = SetCookieRequest::from_record(&cookie);

    let rendered = format!("{cookie:?} {request:?}");
    assert!(!rendered.contains(SECRET), "value leaked: {rendered}");
    assert!(rendered.contains("[REDACTED]"));
}

#[tokio::test]
async fn p0_browser_debug_redacts_jar_contents() {
    let browser = MemoryBrowser::new(vec![domain_cookie("sid", SECRET, ".example.com")])
        .with_active_tab("https://example.com/");
    let rendered = format!("{browser:?}");
    assert!(!rendered.contains(SECRET), "value leaked: {rendered}");
}

#[tokio::test]
async fn p0_switch_report_carries_no_values() {
    let store = store_with_personas(&["example.com"]).await;
    store
        .save_cookies(
            "B",
            &[
                domain_cookie("ok", SECRET, ".example.com"),
                domain_cookie("blocked", SECRET, ".example.com"),
            ],
        )
        .await
        .unwrap();
    let browser = Arc::new(MemoryBrowser::default().with_active_tab("https://example.com/"));
    browser.reject_cookie("blocked").await;

    let outcome = coordinator(&store, &browser)
        .run_switch(&SwitchEvent::new(None, Some("B")))
        .await
        .unwrap();

    let SwitchOutcome::Completed(report) = &outcome else {
        panic!("expected completed switch");
    };
    assert_eq!(report.failures.len(), 1);
    let rendered = format!("{outcome:?} {}", report.failures[0].error);
    assert!(!rendered.contains(SECRET), "value leaked: {rendered}");
}

#[cfg(unix)]
#[tokio::test]
async fn p0_persisted_jar_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let jar_path = temp_dir.path().join("cookies.json");
    let jar = JarFileBrowser::open(&jar_path, None).unwrap();
    jar.persist().await.unwrap();

    let mode = std::fs::metadata(&jar_path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
