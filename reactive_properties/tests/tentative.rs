use reactive_properties::{
    computed::TentativeProperty, error::PropertyError, graph::Subscription,
    prelude::*, stored::StoredProperty,
};
use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::sleep;

const DURATION: Duration = Duration::from_millis(1000);

type Events<T> = Arc<Mutex<Vec<(T, T)>>>;

fn record<P>(property: &P) -> (Events<P::Value>, Subscription)
where
    P: Subscribe,
    P::Value: Clone + Send + 'static,
{
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscription = property.subscribe({
        let events = Arc::clone(&events);
        move |event| {
            events
                .lock()
                .unwrap()
                .push((event.old.clone(), event.new.clone()))
        }
    });
    (events, subscription)
}

#[tokio::test(start_paused = true)]
async fn mirrors_parent_when_not_overridden() {
    let parent = StoredProperty::new(1);
    let p = TentativeProperty::new(parent.clone(), DURATION).unwrap();
    let (events, _sub) = record(&p);

    parent.set(2);

    assert_eq!(p.get(), 2);
    assert!(!p.is_overridden());
    assert_eq!(*events.lock().unwrap(), vec![(1, 2)]);
}

#[tokio::test(start_paused = true)]
async fn override_expires_to_parents_current_value() {
    let parent = StoredProperty::new(1);
    let p = TentativeProperty::new(parent.clone(), DURATION).unwrap();
    let (events, _sub) = record(&p);

    p.set(10);
    assert_eq!(p.get(), 10);
    assert!(p.is_overridden());

    parent.set(2);
    assert_eq!(p.get(), 10);

    sleep(DURATION + Duration::from_millis(1)).await;

    assert_eq!(p.get(), 2);
    assert!(!p.is_overridden());
    assert_eq!(*events.lock().unwrap(), vec![(1, 10), (10, 2)]);

    parent.set(3);
    assert_eq!(p.get(), 3);
}

#[tokio::test(start_paused = true)]
async fn setting_again_restarts_countdown() {
    let parent = StoredProperty::new(0);
    let p = TentativeProperty::new(parent.clone(), DURATION).unwrap();

    p.set(1);
    sleep(DURATION.mul_f64(0.8)).await;
    assert_eq!(p.get(), 1);

    p.set(2);
    sleep(DURATION.mul_f64(0.8)).await;
    // past the first override's expiry, but not the second's
    assert_eq!(p.get(), 2);

    sleep(DURATION.mul_f64(0.4)).await;
    assert_eq!(p.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn override_with_current_value_still_holds_off_parent() {
    let parent = StoredProperty::new(5);
    let p = TentativeProperty::new(parent.clone(), DURATION).unwrap();
    let (events, _sub) = record(&p);

    p.set(5);
    assert!(p.is_overridden());
    parent.set(6);
    assert_eq!(p.get(), 5);

    sleep(DURATION * 2).await;
    assert_eq!(p.get(), 6);
    assert_eq!(*events.lock().unwrap(), vec![(5, 6)]);
}

#[tokio::test(start_paused = true)]
async fn dispose_cancels_pending_revert() {
    let parent = StoredProperty::new(1);
    let p = TentativeProperty::new(parent.clone(), DURATION).unwrap();

    p.set(10);
    p.dispose();
    p.dispose();
    assert!(!p.is_overridden());

    sleep(DURATION * 2).await;
    assert_eq!(p.get(), 10);

    // back to following the parent
    parent.set(2);
    assert_eq!(p.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn can_be_overridden_again_after_dispose() {
    let parent = StoredProperty::new(1);
    let p = TentativeProperty::new(parent.clone(), DURATION).unwrap();

    p.dispose();
    p.set(7);
    assert!(p.is_overridden());

    sleep(DURATION * 2).await;
    assert_eq!(p.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_releases_parent() {
    let parent = StoredProperty::new(1);
    let p = TentativeProperty::new(parent.clone(), DURATION).unwrap();
    p.set(2);
    assert_eq!(parent.to_any_source().listener_count(), 1);

    drop(p);
    assert_eq!(parent.to_any_source().listener_count(), 0);

    // the aborted revert never runs against the dropped property
    sleep(DURATION * 2).await;
}

#[test]
fn requires_a_runtime() {
    let result = TentativeProperty::new(StoredProperty::new(1), DURATION);
    assert_eq!(result.unwrap_err(), PropertyError::NoRuntime);
}

#[tokio::test]
async fn rejects_zero_duration() {
    let result = TentativeProperty::new(StoredProperty::new(1), Duration::ZERO);
    assert_eq!(result.unwrap_err(), PropertyError::ZeroDuration);
}

#[test]
fn runs_reverts_on_given_runtime() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();
    let parent = StoredProperty::new(1);
    let p = TentativeProperty::with_runtime(
        parent.clone(),
        DURATION,
        runtime.handle().clone(),
    )
    .unwrap();

    p.set(2);
    assert_eq!(p.get(), 2);

    runtime.block_on(async { sleep(DURATION * 2).await });
    assert_eq!(p.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn dispose_at_expiry_either_completes_or_suppresses_revert() {
    let parent = StoredProperty::new(1);
    let p = TentativeProperty::new(parent.clone(), DURATION).unwrap();
    let (events, _sub) = record(&p);

    p.set(10);
    parent.set(2);
    sleep(DURATION).await;
    p.dispose();

    let value = p.get();
    assert!(!p.is_overridden());
    match value {
        2 => assert_eq!(*events.lock().unwrap(), vec![(1, 10), (10, 2)]),
        10 => assert_eq!(*events.lock().unwrap(), vec![(1, 10)]),
        other => panic!("unexpected value after dispose: {other}"),
    }

    sleep(DURATION * 2).await;
    assert_eq!(p.get(), value);
    parent.set(3);
    assert_eq!(p.get(), 3);
}

#[test]
fn dispose_racing_expiry_on_worker_threads() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .build()
        .unwrap();
    let parent = StoredProperty::new(0);
    let p = TentativeProperty::with_runtime(
        parent.clone(),
        Duration::from_millis(1),
        runtime.handle().clone(),
    )
    .unwrap();

    for round in 1..=50 {
        p.set(round);
        std::thread::sleep(Duration::from_millis(1));
        p.dispose();

        // once dispose returns, a revert has either happened or never will
        let settled = p.get();
        assert!(settled == round || settled == 0, "{settled}");
        assert!(!p.is_overridden());
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(p.get(), settled);
    }
}

#[derive(Clone, Debug)]
struct Reading(i32);

impl PartialEq for Reading {
    fn eq(&self, other: &Self) -> bool {
        assert!(self.0 >= 0 && other.0 >= 0, "negative reading");
        self.0 == other.0
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_comparison_leaves_property_usable() {
    let parent = StoredProperty::new(Reading(1));
    let p = TentativeProperty::new(parent.clone(), DURATION).unwrap();

    let result = catch_unwind(AssertUnwindSafe(|| p.set(Reading(-1))));
    assert!(result.is_err());
    assert_eq!(p.get(), Reading(1));

    p.set(Reading(2));
    assert_eq!(p.get(), Reading(2));
    assert!(p.is_overridden());

    sleep(DURATION * 2).await;
    assert_eq!(p.get(), Reading(1));
}
