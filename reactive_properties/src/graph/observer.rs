use super::AnySource;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::cell::RefCell;

type ReadSet = IndexSet<AnySource, FxBuildHasher>;

thread_local! {
    static OBSERVER: RefCell<Option<ReadSet>> = const { RefCell::new(None) };
}

/// The tracking context of the current thread.
///
/// While [`track_reads`] is running, every tracked read
/// ([`Get::get`](crate::traits::Get::get)) on this thread is recorded here.
pub struct Observer;

impl Observer {
    /// Whether a tracked evaluation is running on this thread.
    pub fn is_tracking() -> bool {
        OBSERVER.with_borrow(|o| o.is_some())
    }

    pub(crate) fn record(source: AnySource) {
        OBSERVER.with_borrow_mut(|o| {
            if let Some(reads) = o {
                reads.insert(source);
            }
        })
    }
}

/// Restores the previous observer when dropped, so a panicking evaluation does not leave its
/// read set installed.
struct ObserverGuard {
    prev: Option<Option<ReadSet>>,
}

impl ObserverGuard {
    fn install(observer: Option<ReadSet>) -> Self {
        let prev = OBSERVER.with(|o| o.replace(observer));
        Self { prev: Some(prev) }
    }

    fn finish(mut self) -> Option<ReadSet> {
        let prev = self.prev.take().flatten();
        OBSERVER.with(|o| o.replace(prev))
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        if let Some(prev) = self.prev.take() {
            OBSERVER.with(|o| *o.borrow_mut() = prev);
        }
    }
}

/// Runs `fun` as a tracked evaluation.
///
/// Returns its result together with every property read through
/// [`Get::get`](crate::traits::Get::get) while it ran, in the order they were first read and
/// without duplicates. Reads made by a nested tracked evaluation belong to that evaluation only.
///
/// ```
/// # use reactive_properties::prelude::*;
/// # use reactive_properties::{graph::track_reads, stored::StoredProperty};
/// let a = StoredProperty::new(1);
/// let b = StoredProperty::new(2);
///
/// let (sum, reads) = track_reads(|| a.get() + b.get_untracked() + a.get());
/// assert_eq!(sum, 4);
/// assert_eq!(reads, vec![a.to_any_source()]);
/// ```
pub fn track_reads<T>(fun: impl FnOnce() -> T) -> (T, Vec<AnySource>) {
    let guard = ObserverGuard::install(Some(ReadSet::default()));
    let value = fun();
    let reads = guard.finish().unwrap_or_default();
    (value, reads.into_iter().collect())
}

/// Runs `fun` without recording any of its reads into the current tracked evaluation.
pub fn untrack<T>(fun: impl FnOnce() -> T) -> T {
    let guard = ObserverGuard::install(None);
    let value = fun();
    drop(guard);
    value
}
