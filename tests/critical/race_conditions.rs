//! Switches must never interleave with each other or with guarded deletions.

use std::sync::Arc;
use std::time::Duration;

use alterego_core::{
    BrowserAgent, BrowserError, BrowsingDataKinds, CookieRecord, MemoryBrowser, PersonaRegistry,
    PersonaSwitchCoordinator, SetCookieError, SetCookieRequest, StateStore, SwitchDispatcher,
    SwitchEvent, SwitchOutcome, store::cookies_key,
};
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::support::{assert_unique_keys, domain_cookie, store_with_hosts, store_with_personas};

/// Browser whose cookie read blocks until released, pinning a switch mid-flight.
struct PausingBrowser {
    inner: MemoryBrowser,
    reading: Notify,
    release: Notify,
}

#[async_trait]
impl BrowserAgent for PausingBrowser {
    async fn active_tab_host(&self) -> Option<String> {
        self.inner.active_tab_host().await
    }

    async fn get_all_cookies(&self) -> Result<Vec<CookieRecord>, BrowserError> {
        self.reading.notify_one();
        self.release.notified().await;
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

#[tokio::test]
async fn p0_delete_waits_for_in_flight_switch() {
    let store = store_with_hosts(&["example.com"]).await;
    let browser = Arc::new(PausingBrowser {
        inner: MemoryBrowser::new(vec![domain_cookie("sid", "a", ".example.com")])
            .with_active_tab("https://example.com/"),
        reading: Notify::new(),
        release: Notify::new(),
    });
    let coordinator = Arc::new(PersonaSwitchCoordinator::new(store.clone(), browser.clone()));
    let registry = Arc::new(PersonaRegistry::new(store.clone()).with_gate(coordinator.gate()));
    let a = registry.create_persona("A").await.unwrap();

    let switching = {
        let coordinator = Arc::clone(&coordinator);
        let event = SwitchEvent::new(Some(&a.id), None);
        tokio::spawn(async move { coordinator.run_switch(&event).await })
    };
    browser.reading.notified().await;

    let deleting = {
        let registry = Arc::clone(&registry);
        let id = a.id.clone();
        tokio::spawn(async move { registry.delete_persona(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!deleting.is_finished(), "deletion must wait for the switch");
    assert_eq!(registry.list_personas().await.unwrap().len(), 1);

    browser.release.notify_one();
    switching.await.unwrap().unwrap();
    deleting.await.unwrap().unwrap();

    // The switch saved A's snapshot, then the deletion removed it.
    assert!(registry.list_personas().await.unwrap().is_empty());
    assert!(store.get_cookies(&a.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn p0_queued_switch_does_not_resurrect_deleted_persona() {
    let store = store_with_hosts(&["example.com"]).await;
    let browser = Arc::new(
        MemoryBrowser::new(vec![domain_cookie("sid", "a", ".example.com")])
            .with_active_tab("https://example.com/"),
    );
    let coordinator = Arc::new(PersonaSwitchCoordinator::new(store.clone(), browser.clone()));
    let dispatcher = SwitchDispatcher::spawn(Arc::clone(&coordinator));
    let mut completions = dispatcher.subscribe();
    let registry = Arc::new(
        PersonaRegistry::new(store.clone())
            .with_gate(coordinator.gate())
            .with_switch_notifier(dispatcher.notifier()),
    );
    let a = registry.create_persona("A").await.unwrap();
    let b = registry.create_persona("B").await.unwrap();

    // Hold the gate so both switches stay queued behind it.
    let held = coordinator.gate().acquire().await;
    registry.select_persona(Some(&a.id)).await.unwrap();
    registry.select_persona(Some(&b.id)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let deleting = {
        let registry = Arc::clone(&registry);
        let id = a.id.clone();
        tokio::spawn(async move { registry.delete_persona(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!deleting.is_finished());

    // The first switch runs, then the deletion, then the A -> B switch.
    drop(held);
    deleting.await.unwrap().unwrap();
    dispatcher.shutdown().await;

    let first = completions.recv().await.unwrap();
    assert!(first.outcome.is_ok());
    let second = completions.recv().await.unwrap();
    assert_eq!(second.event, SwitchEvent::new(Some(&a.id), Some(&b.id)));
    let Ok(SwitchOutcome::Completed(report)) = second.outcome else {
        panic!("expected completed switch: {:?}", second.outcome);
    };
    assert_eq!(report.saved, None);

    let names: Vec<String> = registry
        .list_personas()
        .await
        .unwrap()
        .into_iter()
        .map(|persona| persona.name)
        .collect();
    assert_eq!(names, vec!["B".to_string()]);
    assert!(
        !store.keys().await.contains(&cookies_key(&a.id)),
        "deleted persona's snapshot was written back"
    );
}

#[tokio::test]
async fn p0_burst_of_events_is_processed_in_order() {
    let store = store_with_personas(&["example.com"]).await;
    let browser = Arc::new(
        MemoryBrowser::new(vec![domain_cookie("sid", "a", ".example.com")])
            .with_active_tab("https://example.com/"),
    );
    let dispatcher = SwitchDispatcher::spawn(Arc::new(PersonaSwitchCoordinator::new(
        store.clone(),
        browser.clone(),
    )));
    let mut completions = dispatcher.subscribe();
    let notifier = dispatcher.notifier();

    let ids = ["A", "B", "C"];
    let mut expected = Vec::new();
    let mut previous: Option<&str> = None;
    for round in 0..12 {
        let next = ids[round % ids.len()];
        let event = SwitchEvent::new(previous, Some(next));
        notifier.notify(event.clone()).unwrap();
        expected.push(event);
        previous = Some(next);
    }
    dispatcher.shutdown().await;

    for event in expected {
        let completion = completions.recv().await.unwrap();
        assert_eq!(completion.event, event);
        assert!(completion.outcome.is_ok());
    }
    for id in ids {
        assert_unique_keys(&store.get_cookies(id).await.unwrap());
    }
    assert_unique_keys(&browser.cookies().await);
}

#[tokio::test]
async fn p1_remove_host_waits_for_in_flight_switch() {
    let store = store_with_personas(&["example.com"]).await;
    let browser = Arc::new(PausingBrowser {
        inner: MemoryBrowser::default().with_active_tab("https://example.com/"),
        reading: Notify::new(),
        release: Notify::new(),
    });
    let coordinator = Arc::new(PersonaSwitchCoordinator::new(store.clone(), browser.clone()));
    let registry = Arc::new(PersonaRegistry::new(store.clone()).with_gate(coordinator.gate()));

    let switching = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.run_switch(&SwitchEvent::new(Some("A"), None)).await })
    };
    browser.reading.notified().await;

    let removing = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.remove_allowed_host("example.com").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!removing.is_finished());

    browser.release.notify_one();
    switching.await.unwrap().unwrap();
    assert!(removing.await.unwrap().unwrap());
    assert!(registry.allowed_hosts().await.unwrap().is_empty());
}
