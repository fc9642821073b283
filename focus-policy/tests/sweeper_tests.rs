mod common;

use common::*;
use focus_policy::{ExpirySweeper, ManualClock, NoopNavigation, PolicyStore};
use focus_storage::{keys, MemoryPrefsStore};
use focus_types::AppId;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const START: u64 = 1_700_000_000_000;

/// Sweeper over `store` that reads `clock` and never shows a detail page.
fn headless_sweeper(store: &Arc<PolicyStore>, clock: &ManualClock) -> ExpirySweeper {
    ExpirySweeper::new(store.clone(), Arc::new(clock.clone()), Arc::new(NoopNavigation))
}

/// Store with `app_id(0)` restricted, then temporarily unrestricted until
/// `START + 2_000`.
async fn overridden_store() -> (Arc<PolicyStore>, MemoryPrefsStore, AppId) {
    let (store, prefs) = loaded_store(sample_apps(2)).await;
    let x = app_id(0);
    store.toggle_restriction(&x, true).await;
    assert!(store.set_temporary_override(&x, START + 2_000).await);
    (Arc::new(store), prefs, x)
}

#[tokio::test]
async fn sweep_before_deadline_changes_nothing() {
    let (store, _, x) = overridden_store().await;
    let clock = ManualClock::new(START + 1_999);
    let sweeper = headless_sweeper(&store, &clock);

    assert!(sweeper.sweep().await.is_empty());
    assert!(!store.snapshot().is_restricted(&x));
    assert_eq!(store.override_expiry(&x), Some(START + 2_000));
}

#[tokio::test]
async fn sweep_after_deadline_re_restricts() {
    let (store, prefs, x) = overridden_store().await;
    let clock = ManualClock::new(START);
    let sweeper = headless_sweeper(&store, &clock);

    clock.advance(2_000);
    assert_eq!(sweeper.sweep().await, vec![x.clone()]);

    let view = store.snapshot();
    assert!(view.is_restricted(&x));
    assert_eq!(view.override_expiry(&x), None);
    assert_eq!(persisted_ids(&prefs, keys::RESTRICTED_APPS), vec![x]);
    assert_eq!(prefs.raw(keys::TEMPORARY_UNRESTRICTIONS), Some("[]".to_string()));
}

#[tokio::test]
async fn sweep_redirects_home_from_expired_detail() {
    let (store, _, x) = overridden_store().await;
    let clock = ManualClock::new(START + 10_000);
    let nav = Arc::new(RecordingNavigation::showing(&x));
    let sweeper = ExpirySweeper::new(store.clone(), Arc::new(clock), nav.clone());

    sweeper.sweep().await;
    assert_eq!(nav.redirect_count(), 1);
    assert_eq!(*nav.detail.lock().unwrap(), None);
}

#[tokio::test]
async fn sweep_leaves_other_detail_pages_alone() {
    let (store, _, _) = overridden_store().await;
    let clock = ManualClock::new(START + 10_000);
    let nav = Arc::new(RecordingNavigation::showing(&app_id(1)));
    let sweeper = ExpirySweeper::new(store.clone(), Arc::new(clock), nav.clone());

    assert_eq!(sweeper.sweep().await.len(), 1);
    assert_eq!(nav.redirect_count(), 0);
}

#[tokio::test]
async fn sweep_expires_several_earliest_first() {
    let (store, _) = loaded_store(sample_apps(3)).await;
    let store = Arc::new(store);
    store.set_restricted_apps((0..3).map(app_id)).await;
    store.set_temporary_override(&app_id(2), START + 100).await;
    store.set_temporary_override(&app_id(0), START + 300).await;
    store.set_temporary_override(&app_id(1), START + 900).await;

    let mut rx = store.subscribe();
    let clock = ManualClock::new(START + 500);
    let sweeper = headless_sweeper(&store, &clock);
    let before = rx.borrow_and_update().revision();

    assert_eq!(sweeper.sweep().await, vec![app_id(2), app_id(0)]);
    // one emission per expired override
    assert_eq!(rx.borrow_and_update().revision(), before + 2);
    assert_eq!(store.override_expiry(&app_id(1)), Some(START + 900));
}

#[tokio::test]
async fn period_defaults_to_config_and_can_be_overridden() {
    let (store, _, _) = overridden_store().await;
    let sweeper = headless_sweeper(&store, &ManualClock::new(START));
    assert_eq!(sweeper.period(), Duration::from_secs(5));

    let sweeper = sweeper.with_period(Duration::ZERO);
    assert_eq!(sweeper.period(), Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn spawned_sweeper_expires_on_next_tick() {
    let (store, _, x) = overridden_store().await;
    let clock = ManualClock::new(START);
    let mut rx = store.subscribe();
    let handle = headless_sweeper(&store, &clock).spawn();
    assert!(handle.is_running());

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(!store.snapshot().is_restricted(&x));

    clock.advance(2_000);
    tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|v| v.is_restricted(&x)))
        .await
        .expect("sweeper did not run")
        .unwrap();
    assert_eq!(store.override_expiry(&x), None);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn first_tick_catches_overrides_lapsed_while_stopped() {
    let (store, _, x) = overridden_store().await;
    let clock = ManualClock::new(START + 60_000);
    let mut rx = store.subscribe();
    let handle = headless_sweeper(&store, &clock).spawn();

    tokio::time::timeout(Duration::from_millis(1), rx.wait_for(|v| v.is_restricted(&x)))
        .await
        .expect("first sweep should be immediate")
        .unwrap();
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stopped_sweeper_no_longer_expires() {
    let (store, _, x) = overridden_store().await;
    let clock = ManualClock::new(START);
    let handle = headless_sweeper(&store, &clock).spawn();
    tokio::task::yield_now().await;

    handle.stop().await;
    clock.advance(10_000);
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(!store.snapshot().is_restricted(&x));
    assert_eq!(store.override_expiry(&x), Some(START + 2_000));
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_cancels_sweeper() {
    let (store, _, x) = overridden_store().await;
    let clock = ManualClock::new(START);
    let handle = headless_sweeper(&store, &clock).spawn();
    tokio::task::yield_now().await;

    drop(handle);
    clock.advance(10_000);
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(!store.snapshot().is_restricted(&x));
}
