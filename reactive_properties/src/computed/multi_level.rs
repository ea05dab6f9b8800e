use super::inner::listen_for_dependency_updates;
use crate::{
    cell::PropertyCell,
    error::PropertyError,
    graph::{track_reads, AnySource, Subscription},
    traits::{Get, GetUntracked, Property},
};
use or_poisoned::OrPoisoned;
use std::{
    panic::Location,
    sync::{Arc, Mutex, Weak},
};

/// A property that follows a chain of property reads, like "the name of the current
/// participant", in which the identity of an intermediate property can itself change.
///
/// Its dependencies are discovered by running the evaluation while recording every tracked read
/// ([`Get::get`]). Whenever any of them changes, the property unsubscribes from all of them,
/// evaluates again, and subscribes to exactly the properties read this time. Properties that
/// are no longer on the path stop affecting it.
///
/// ```
/// # use reactive_properties::prelude::*;
/// # use reactive_properties::{computed::MultiLevelProperty, stored::StoredProperty};
/// #[derive(Clone, PartialEq)]
/// struct Participant {
///     name: StoredProperty<String>,
/// }
///
/// let alice = Participant { name: StoredProperty::new("Alice".into()) };
/// let bob = Participant { name: StoredProperty::new("Bob".into()) };
/// let current = StoredProperty::new(alice.clone());
///
/// let current_name = MultiLevelProperty::new({
///     let current = current.clone();
///     move || current.get().name
/// })
/// .unwrap();
/// assert_eq!(current_name.get(), "Alice");
///
/// current.set(bob.clone());
/// assert_eq!(current_name.get(), "Bob");
///
/// // alice is no longer on the path
/// alice.name.set("Alicia".into());
/// assert_eq!(current_name.get(), "Bob");
/// bob.name.set("Robert".into());
/// assert_eq!(current_name.get(), "Robert");
/// ```
pub struct MultiLevelProperty<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    inner: Arc<MultiLevelInner<T>>,
}

struct MultiLevelInner<T> {
    cell: Arc<PropertyCell<T>>,
    #[allow(clippy::type_complexity)]
    fun: Box<dyn Fn() -> T + Send + Sync>,
    dependencies: Mutex<Vec<Subscription>>,
}

impl<T> MultiLevelInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn refresh(self: &Arc<Self>) {
        let stale =
            std::mem::take(&mut *self.dependencies.lock().or_poisoned());
        drop(stale);

        let (value, reads) = track_reads(|| (self.fun)());

        #[cfg(feature = "tracing")]
        tracing::trace!(
            dependencies = reads.len(),
            "rediscovered multi-level dependencies"
        );

        self.cell.store(value);

        let subscriptions = listen_for_dependency_updates(
            &Arc::downgrade(self),
            &reads,
            Self::refresh,
        );
        *self.dependencies.lock().or_poisoned() = subscriptions;
    }
}

impl_computed_handle!(MultiLevelProperty);

impl<T> MultiLevelProperty<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a property whose value is the value of the property `accessor` returns.
    ///
    /// `accessor` should reach the property through tracked reads, e.g.
    /// `move || roster.get().current.get().name`: each property read on the way, and the
    /// returned property itself, become dependencies.
    #[track_caller]
    pub fn new<P, A>(accessor: A) -> Result<Self, PropertyError>
    where
        A: Fn() -> P + Send + Sync + 'static,
        P: Property<T>,
    {
        Self::tracked(move || accessor().get())
    }

    /// Creates a property whose value is the result of `fun`, depending on every property that
    /// `fun` reads with [`Get::get`] during its most recent run.
    ///
    /// Fails if the first run does not read any property.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn tracked(
        fun: impl Fn() -> T + Send + Sync + 'static,
    ) -> Result<Self, PropertyError> {
        let (value, reads) = track_reads(&fun);
        if reads.is_empty() {
            return Err(PropertyError::NothingTracked);
        }

        let inner = Arc::new_cyclic(|weak: &Weak<MultiLevelInner<T>>| {
            MultiLevelInner {
                cell: Arc::new(PropertyCell::new(value, T::eq)),
                fun: Box::new(fun),
                dependencies: Mutex::new(listen_for_dependency_updates(
                    weak,
                    &reads,
                    MultiLevelInner::refresh,
                )),
            }
        });
        Ok(Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner,
        })
    }
}

impl<T> MultiLevelProperty<T> {
    /// The properties read during the most recent evaluation, in the order they were first read.
    pub fn dependencies(&self) -> Vec<AnySource> {
        self.inner
            .dependencies
            .lock()
            .or_poisoned()
            .iter()
            .map(|subscription| subscription.source().clone())
            .collect()
    }
}

impl<T> GetUntracked for MultiLevelProperty<T>
where
    T: Clone,
{
    type Value = T;

    fn get_untracked(&self) -> T {
        self.inner.cell.get()
    }
}
