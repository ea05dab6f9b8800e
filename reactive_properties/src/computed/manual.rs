use crate::{cell::PropertyCell, graph::untrack, traits::GetUntracked};
use std::{panic::Location, sync::Arc};

/// A property that is only recomputed when [`recalculate`](Self::recalculate) is called.
///
/// This is useful for values that change without any property changing, like the current time,
/// or whose dependencies cannot be observed.
pub struct ManuallyRecalculatedProperty<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    inner: Arc<ManualInner<T>>,
}

struct ManualInner<T> {
    cell: Arc<PropertyCell<T>>,
    #[allow(clippy::type_complexity)]
    fun: Box<dyn Fn() -> T + Send + Sync>,
}

impl_computed_handle!(ManuallyRecalculatedProperty);

impl<T> ManuallyRecalculatedProperty<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a property holding the result of `fun`, which runs once now.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn new(fun: impl Fn() -> T + Send + Sync + 'static) -> Self {
        let value = untrack(&fun);
        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner: Arc::new(ManualInner {
                cell: Arc::new(PropertyCell::new(value, T::eq)),
                fun: Box::new(fun),
            }),
        }
    }

    /// Runs the function again, notifying listeners if the result differs from the cached
    /// value. Returns whether it did.
    pub fn recalculate(&self) -> bool {
        let value = untrack(|| (self.inner.fun)());
        self.inner.cell.store(value)
    }
}

impl<T> GetUntracked for ManuallyRecalculatedProperty<T>
where
    T: Clone,
{
    type Value = T;

    fn get_untracked(&self) -> T {
        self.inner.cell.get()
    }
}
