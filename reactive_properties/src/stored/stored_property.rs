use crate::{
    cell::PropertyCell,
    event::Listener,
    graph::{AnySource, Subscription, ToAnySource},
    traits::{DefinedAt, GetUntracked, Set, Subscribe},
};
use core::fmt::{Debug, Formatter, Result};
use std::{hash::Hash, panic::Location, sync::Arc};

/// A value that can be set directly, notifying its listeners whenever it changes.
///
/// This is the leaf of every property graph: every other kind of property ultimately derives
/// its value from one or more `StoredProperty`s.
///
/// `StoredProperty` is a reference-counted handle. Cloning it creates another handle to the same
/// value, and two handles compare equal when they refer to the same value.
///
/// ```
/// # use reactive_properties::prelude::*;
/// # use reactive_properties::stored::StoredProperty;
/// # use std::sync::{Arc, Mutex};
/// let name = StoredProperty::new(String::from("Alice"));
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let _subscription = name.subscribe({
///     let log = Arc::clone(&log);
///     move |event| log.lock().unwrap().push(format!("{} -> {}", event.old, event.new))
/// });
///
/// name.set("Bob".into());
/// // setting an equal value does nothing
/// name.set("Bob".into());
/// name.update(|name| name.push_str("by"));
///
/// assert_eq!(name.get(), "Bobby");
/// assert_eq!(*log.lock().unwrap(), vec!["Alice -> Bob", "Bob -> Bobby"]);
/// ```
pub struct StoredProperty<T> {
    #[cfg(debug_assertions)]
    pub(crate) defined_at: &'static Location<'static>,
    pub(crate) inner: Arc<PropertyCell<T>>,
}

impl<T> Clone for StoredProperty<T> {
    #[track_caller]
    fn clone(&self) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: self.defined_at,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for StoredProperty<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("StoredProperty")
            .field("type", &std::any::type_name::<T>())
            .field("value", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl<T> PartialEq for StoredProperty<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for StoredProperty<T> {}

impl<T> Hash for StoredProperty<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(&Arc::as_ptr(&self.inner), state);
    }
}

impl<T> Default for StoredProperty<T>
where
    T: Default + PartialEq + Clone + Send + Sync + 'static,
{
    #[track_caller]
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> StoredProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a property holding `value`. Setting it to a value that is `==` to the current one
    /// is ignored.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn new(value: T) -> Self
    where
        T: PartialEq,
    {
        Self::new_with_compare(value, T::eq)
    }

    /// Creates a property holding `value`, using `is_same` to decide whether a new value is a
    /// change.
    ///
    /// This is how a value with reference identity, like an `Arc<_>` compared with
    /// [`Arc::ptr_eq`], or a type without `PartialEq` is stored.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn new_with_compare(value: T, is_same: fn(&T, &T) -> bool) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner: Arc::new(PropertyCell::new(value, is_same)),
        }
    }

    /// Updates the value in place, notifying listeners if the result differs from the value
    /// before the update.
    ///
    /// `fun` runs under the property's write lock, so it must not access this property.
    pub fn update(&self, fun: impl FnOnce(&mut T)) {
        self.inner.update_with(|value| {
            let mut new = value.clone();
            fun(&mut new);
            (Some(new), ())
        })
    }
}

impl<T> DefinedAt for StoredProperty<T> {
    #[inline(always)]
    fn defined_at(&self) -> Option<&'static Location<'static>> {
        #[cfg(debug_assertions)]
        {
            Some(self.defined_at)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    }
}

impl<T> ToAnySource for StoredProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn to_any_source(&self) -> AnySource {
        AnySource::new(&self.inner, self.defined_at())
    }
}

impl<T> GetUntracked for StoredProperty<T>
where
    T: Clone,
{
    type Value = T;

    fn get_untracked(&self) -> T {
        self.inner.get()
    }
}

impl<T> Subscribe for StoredProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn add_listener(&self, listener: Listener<T>) -> Subscription {
        let id = self.inner.add_listener(listener);
        Subscription::new(self.to_any_source(), id)
    }
}

impl<T> Set for StoredProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn set(&self, value: T) {
        self.inner.store(value);
    }
}
