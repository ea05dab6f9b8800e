use reactive_properties::{
    computed::DerivedProperty, error::PropertyError, graph::Subscription,
    prelude::*, stored::StoredProperty,
};
use std::{
    collections::HashMap,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
};

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

#[test]
fn absolute_value_of_leaf() {
    let x = StoredProperty::new(8);
    let abs = DerivedProperty::map(x.clone(), |x: i32| x.abs());
    assert_eq!(abs.get(), 8);

    let (events, _sub) = record(&abs);
    x.set(-9);

    assert_eq!(*events.lock().unwrap(), vec![(8, 9)]);
    assert_eq!(abs.get(), 9);
}

#[test]
fn equal_recomputation_is_silent() {
    let x = StoredProperty::new(3);
    let abs = DerivedProperty::map(x.clone(), |x: i32| x.abs());
    let (events, _sub) = record(&abs);

    x.set(-3);

    assert_eq!(abs.get(), 3);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn recomputes_once_per_change_not_per_read() {
    let calculations = Arc::new(AtomicUsize::new(0));
    let a = StoredProperty::new(1);
    let b = StoredProperty::new(2);
    let c = StoredProperty::new(3);

    let d = DerivedProperty::from_dependencies(
        (a.clone(), b.clone(), c.clone()),
        {
            let calculations = Arc::clone(&calculations);
            move |(a, b, c)| {
                calculations.fetch_add(1, Ordering::Relaxed);
                a + b + c
            }
        },
    );
    assert_eq!(d.get(), 6);
    assert_eq!(d.get(), 6);
    assert_eq!(calculations.load(Ordering::Relaxed), 1);

    a.set(0);
    assert_eq!(d.get(), 5);
    assert_eq!(calculations.load(Ordering::Relaxed), 2);

    // not a change, so nothing recomputes
    b.set(2);
    assert_eq!(calculations.load(Ordering::Relaxed), 2);
}

#[test]
fn propagation_is_transitive_and_complete_before_set_returns() {
    let a = StoredProperty::new(1);
    let b = DerivedProperty::map(a.clone(), |a: i32| a * 10);
    let c = DerivedProperty::map(b.clone(), |b: i32| b + 1);
    let (events, _sub) = record(&c);

    a.set(2);

    assert_eq!(b.get(), 20);
    assert_eq!(c.get(), 21);
    assert_eq!(*events.lock().unwrap(), vec![(11, 21)]);
}

#[test]
fn every_direct_dependent_fires_exactly_once() {
    let x = StoredProperty::new(1);
    let doubled = DerivedProperty::map(x.clone(), |x: i32| x * 2);
    let negated = DerivedProperty::map(x.clone(), |x: i32| -x);
    let (doubled_events, _d) = record(&doubled);
    let (negated_events, _n) = record(&negated);

    x.set(4);

    assert_eq!(*doubled_events.lock().unwrap(), vec![(2, 8)]);
    assert_eq!(*negated_events.lock().unwrap(), vec![(-1, -4)]);
}

#[test]
fn heterogeneous_dependency_list() {
    let name = StoredProperty::new(String::from("widget"));
    let count = StoredProperty::new(2_usize);

    let label = DerivedProperty::new(
        vec![name.to_any_source(), count.to_any_source()],
        {
            let name = name.clone();
            let count = count.clone();
            move || format!("{} x{}", name.get(), count.get())
        },
    )
    .unwrap();
    assert_eq!(label.get(), "widget x2");

    count.set(3);
    assert_eq!(label.get(), "widget x3");
    name.set("gadget".into());
    assert_eq!(label.get(), "gadget x3");
    assert_eq!(
        label.dependencies(),
        vec![name.to_any_source(), count.to_any_source()]
    );
}

#[test]
fn empty_dependency_list_is_rejected() {
    let result = DerivedProperty::new(Vec::new(), || 1);
    assert_eq!(result.unwrap_err(), PropertyError::NoDependencies);
}

#[test]
fn custom_comparison() {
    let x = StoredProperty::new(1.0_f64);
    let rounded = DerivedProperty::from_dependencies_with_compare(
        (x.clone(),),
        |(x,)| x,
        |a, b| (a - b).abs() < 0.5,
    );
    let (events, _sub) = record(&rounded);

    x.set(1.2);
    assert_eq!(rounded.get(), 1.0);
    x.set(2.0);
    assert_eq!(rounded.get(), 2.0);
    assert_eq!(*events.lock().unwrap(), vec![(1.0, 2.0)]);
}

#[test]
fn computed_reads_do_not_leak_into_tracked_evaluation() {
    let a = StoredProperty::new(1);
    let b = DerivedProperty::map(a.clone(), |a: i32| a + 1);

    let (_, reads) = reactive_properties::graph::track_reads(|| {
        let c = DerivedProperty::new(vec![a.to_any_source()], {
            let a = a.clone();
            move || a.get() * 3
        })
        .unwrap();
        b.get() + c.get()
    });

    assert_eq!(reads.len(), 2);
    assert_eq!(reads[0], b.to_any_source());
}

// A diamond-shaped dependent is recomputed once per path, observing the
// intermediate state in between.
#[test]
fn diamond_dependent_recomputes_once_per_path() {
    let calculations = Arc::new(AtomicUsize::new(0));
    let a = StoredProperty::new(0);
    let b = DerivedProperty::map(a.clone(), |a: i32| a + 1);
    let c = DerivedProperty::map(a.clone(), |a: i32| a * 2);
    let d = DerivedProperty::from_dependencies((b.clone(), c.clone()), {
        let calculations = Arc::clone(&calculations);
        move |(b, c)| {
            calculations.fetch_add(1, Ordering::Relaxed);
            b + c
        }
    });
    let (events, _sub) = record(&d);
    assert_eq!(d.get(), 1);

    a.set(1);

    assert_eq!(d.get(), 4);
    assert_eq!(calculations.load(Ordering::Relaxed), 3);
    assert_eq!(*events.lock().unwrap(), vec![(1, 2), (2, 4)]);
}

#[test]
fn panicking_computation_propagates_and_leaves_partial_update() {
    let x = StoredProperty::new(1);
    let before = DerivedProperty::map(x.clone(), |x: i32| x + 100);
    let failing = DerivedProperty::map(x.clone(), |x: i32| {
        assert!(x >= 0, "negative input");
        x
    });
    let after = DerivedProperty::map(x.clone(), |x: i32| x - 100);

    let result = catch_unwind(AssertUnwindSafe(|| x.set(-1)));
    assert!(result.is_err());

    assert_eq!(x.get(), -1);
    assert_eq!(before.get(), 99);
    assert_eq!(failing.get(), 1);
    assert_eq!(after.get(), -99);

    // nothing is poisoned: the next change goes through everywhere
    x.set(2);
    assert_eq!(before.get(), 102);
    assert_eq!(failing.get(), 2);
    assert_eq!(after.get(), -98);
}

#[test]
fn panicking_initial_computation_aborts_construction() {
    let x = StoredProperty::new(-1);
    let result = catch_unwind(AssertUnwindSafe(|| {
        DerivedProperty::map(x.clone(), |x: i32| {
            assert!(x >= 0, "negative input");
            x
        })
    }));
    assert!(result.is_err());
    assert_eq!(x.to_any_source().listener_count(), 0);
}

#[test]
fn dropped_dependent_unsubscribes_from_dependencies() {
    let x = StoredProperty::new(1);
    let source = x.to_any_source();

    let doubled = DerivedProperty::map(x.clone(), |x: i32| x * 2);
    let tripled = DerivedProperty::map(x.clone(), |x: i32| x * 3);
    assert_eq!(source.listener_count(), 2);

    drop(doubled);
    assert_eq!(source.listener_count(), 1);
    x.set(2);
    assert_eq!(tripled.get(), 6);

    drop(tripled);
    assert_eq!(source.listener_count(), 0);
}

#[test]
fn dependent_keeps_its_dependencies_alive() {
    let x = StoredProperty::new(1);
    let middle = DerivedProperty::map(x.clone(), |x: i32| x + 1);
    let end = DerivedProperty::map(middle.clone(), |m: i32| m * 2);
    let middle_source = middle.to_any_source();

    drop(middle);
    assert!(middle_source.is_alive());

    x.set(2);
    assert_eq!(end.get(), 6);

    drop(end);
    assert!(!middle_source.is_alive());
}

#[test]
fn panicking_comparison_leaves_dependent_usable() {
    fn non_negative_eq(a: &i32, b: &i32) -> bool {
        assert!(*a >= 0 && *b >= 0, "negative value");
        a == b
    }

    let x = StoredProperty::new(1);
    let d = DerivedProperty::from_dependencies_with_compare(
        (x.clone(),),
        |(x,)| x,
        non_negative_eq,
    );
    let (events, _sub) = record(&d);

    let result = catch_unwind(AssertUnwindSafe(|| x.set(-1)));
    assert!(result.is_err());
    assert_eq!(d.get(), 1);

    x.set(5);
    assert_eq!(x.get(), 5);
    assert_eq!(d.get(), 5);
    assert_eq!(*events.lock().unwrap(), vec![(1, 5)]);
}

#[test]
fn concurrent_triggers_deliver_one_consistent_chain() {
    let x = StoredProperty::new(0_i64);
    let doubled = DerivedProperty::map(x.clone(), |x: i64| x * 2);
    let (events, _sub) = record(&doubled);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..100 {
                    x.increment();
                }
            });
        }
    });

    let last = doubled.get();
    let events = events.lock().unwrap();
    assert!(!events.is_empty());
    assert!(events.iter().all(|(old, new)| old != new));

    // events from different threads may arrive out of order, but each old
    // value is some other event's new value (except the initial value), and
    // vice versa (except `last`)
    let mut balance = HashMap::<i64, i64>::new();
    for (old, new) in events.iter() {
        *balance.entry(*old).or_default() -= 1;
        *balance.entry(*new).or_default() += 1;
    }
    *balance.entry(0).or_default() += 1;
    *balance.entry(last).or_default() -= 1;
    assert!(balance.values().all(|n| *n == 0), "{balance:?}");
}
