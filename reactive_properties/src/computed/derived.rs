use super::{inner::listen_for_dependency_updates, Dependencies};
use crate::{
    cell::PropertyCell,
    error::PropertyError,
    graph::{untrack, AnySource, Subscription, ToAnySource},
    traits::GetUntracked,
};
use std::{
    panic::Location,
    sync::{Arc, Weak},
};

/// A property computed from a fixed set of other properties.
///
/// The function runs once when the property is created, and again, synchronously, every time
/// one of the dependencies changes. Listeners are only notified when the result differs from
/// the cached value.
///
/// The property only holds weak references in its dependencies' listener lists: dropping the
/// last handle to it unsubscribes it from all of them.
///
/// ```
/// # use reactive_properties::prelude::*;
/// # use reactive_properties::{computed::DerivedProperty, stored::StoredProperty};
/// let first = StoredProperty::new(String::from("Ada"));
/// let last = StoredProperty::new(String::from("Lovelace"));
///
/// let full = DerivedProperty::from_dependencies(
///     (first.clone(), last.clone()),
///     |(first, last)| format!("{first} {last}"),
/// );
/// assert_eq!(full.get(), "Ada Lovelace");
///
/// last.set("Byron".into());
/// assert_eq!(full.get(), "Ada Byron");
/// ```
pub struct DerivedProperty<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    inner: Arc<DerivedInner<T>>,
}

struct DerivedInner<T> {
    cell: Arc<PropertyCell<T>>,
    #[allow(clippy::type_complexity)]
    fun: Box<dyn Fn() -> T + Send + Sync>,
    dependencies: Vec<Subscription>,
}

impl<T> DerivedInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn compute_and_notify(self: &Arc<Self>) {
        let value = untrack(|| (self.fun)());
        self.cell.store(value);
    }
}

impl_computed_handle!(DerivedProperty);

impl<T> DerivedProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a property that recomputes `fun` whenever any of `dependencies` changes.
    ///
    /// `fun` runs untracked; it typically closes over typed handles to the same properties
    /// listed in `dependencies`. Fails if `dependencies` is empty.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn new(
        dependencies: Vec<AnySource>,
        fun: impl Fn() -> T + Send + Sync + 'static,
    ) -> Result<Self, PropertyError>
    where
        T: PartialEq,
    {
        Self::new_with_compare(dependencies, fun, T::eq)
    }

    /// Like [`new`](Self::new), using `is_same` to decide whether a recomputed value is a change.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn new_with_compare(
        dependencies: Vec<AnySource>,
        fun: impl Fn() -> T + Send + Sync + 'static,
        is_same: fn(&T, &T) -> bool,
    ) -> Result<Self, PropertyError> {
        if dependencies.is_empty() {
            return Err(PropertyError::NoDependencies);
        }
        Ok(Self::from_parts(&dependencies, Box::new(fun), is_same))
    }

    /// Creates a property whose value is `fun` applied to the value of `dependency`.
    #[track_caller]
    pub fn map<P>(
        dependency: P,
        fun: impl Fn(P::Value) -> T + Send + Sync + 'static,
    ) -> Self
    where
        P: GetUntracked + ToAnySource + Send + Sync + 'static,
        T: PartialEq,
    {
        Self::from_dependencies((dependency,), move |(value,)| fun(value))
    }

    /// Creates a property whose value is `fun` applied to the values of a tuple of properties.
    #[track_caller]
    pub fn from_dependencies<D>(
        dependencies: D,
        fun: impl Fn(D::Values) -> T + Send + Sync + 'static,
    ) -> Self
    where
        D: Dependencies,
        T: PartialEq,
    {
        Self::from_dependencies_with_compare(dependencies, fun, T::eq)
    }

    /// Like [`from_dependencies`](Self::from_dependencies), using `is_same` to decide whether a
    /// recomputed value is a change.
    #[track_caller]
    pub fn from_dependencies_with_compare<D>(
        dependencies: D,
        fun: impl Fn(D::Values) -> T + Send + Sync + 'static,
        is_same: fn(&T, &T) -> bool,
    ) -> Self
    where
        D: Dependencies,
    {
        let sources = dependencies.sources();
        Self::from_parts(
            &sources,
            Box::new(move || fun(dependencies.values())),
            is_same,
        )
    }

    #[track_caller]
    fn from_parts(
        dependencies: &[AnySource],
        fun: Box<dyn Fn() -> T + Send + Sync>,
        is_same: fn(&T, &T) -> bool,
    ) -> Self {
        let value = untrack(|| fun());
        let inner = Arc::new_cyclic(|weak: &Weak<DerivedInner<T>>| {
            DerivedInner {
                cell: Arc::new(PropertyCell::new(value, is_same)),
                fun,
                dependencies: listen_for_dependency_updates(
                    weak,
                    dependencies,
                    DerivedInner::compute_and_notify,
                ),
            }
        });
        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner,
        }
    }

    /// The properties this one is computed from.
    pub fn dependencies(&self) -> Vec<AnySource> {
        self.inner
            .dependencies
            .iter()
            .map(|subscription| subscription.source().clone())
            .collect()
    }
}

impl<T> GetUntracked for DerivedProperty<T>
where
    T: Clone,
{
    type Value = T;

    fn get_untracked(&self) -> T {
        self.inner.cell.get()
    }
}
