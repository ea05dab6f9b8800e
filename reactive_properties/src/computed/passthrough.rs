use super::inner::listen_for_dependency_updates;
use crate::{
    cell::PropertyCell,
    context::ExecutionContext,
    graph::{Subscription, ToAnySource},
    traits::{GetUntracked, Property},
};
use std::{
    panic::Location,
    sync::{Arc, Weak},
};

/// A property whose value is always the value of a parent property.
///
/// Created [`with_context`](Self::with_context), it hands the delivery of its change events to an
/// [`ExecutionContext`], e.g. to notify listeners on a particular thread. Its value is still
/// updated synchronously, so readers see the new value before the parent's `set` returns.
pub struct PassthroughProperty<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    inner: Arc<PassthroughInner<T>>,
}

struct PassthroughInner<T> {
    cell: Arc<PropertyCell<T>>,
    parent: Arc<dyn Property<T>>,
    _parent: Vec<Subscription>,
}

impl<T> PassthroughInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn compute_and_notify(self: &Arc<Self>) {
        self.cell.store(self.parent.get_untracked());
    }
}

impl_computed_handle!(PassthroughProperty);

impl<T> PassthroughProperty<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a property that mirrors `parent`, notifying its listeners on the thread that
    /// changed the parent.
    #[track_caller]
    pub fn new(parent: impl Property<T> + 'static) -> Self {
        Self::from_parts(Arc::new(parent), None)
    }

    /// Creates a property that mirrors `parent`, delivering its change events through `context`.
    #[track_caller]
    pub fn with_context(
        parent: impl Property<T> + 'static,
        context: Arc<dyn ExecutionContext>,
    ) -> Self {
        Self::from_parts(Arc::new(parent), Some(context))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    fn from_parts(
        parent: Arc<dyn Property<T>>,
        context: Option<Arc<dyn ExecutionContext>>,
    ) -> Self {
        let value = parent.get_untracked();
        let source = parent.to_any_source();
        let inner = Arc::new_cyclic(|weak: &Weak<PassthroughInner<T>>| {
            PassthroughInner {
                cell: Arc::new(PropertyCell::with_context(
                    value, T::eq, context,
                )),
                parent,
                _parent: listen_for_dependency_updates(
                    weak,
                    &[source],
                    PassthroughInner::compute_and_notify,
                ),
            }
        });
        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner,
        }
    }
}

impl<T> GetUntracked for PassthroughProperty<T>
where
    T: Clone,
{
    type Value = T;

    fn get_untracked(&self) -> T {
        self.inner.cell.get()
    }
}
