//! A series of traits that describe what a property can do.
//!
//! ## Principles
//! 1. **Composition**: the umbrella traits are blanket implemented for every type that
//!    implements the base traits they are made of.
//! 2. **Object safety**: [`Property`] and [`SettableProperty`] can be used as trait objects, so
//!    a container can hold "some property of `T`" (see
//!    [`ConnectableProperty`](crate::computed::ConnectableProperty)) without knowing which kind.
//!
//! ## Base Traits
//! | Trait              | Description                                                            |
//! |--------------------|------------------------------------------------------------------------|
//! | [`DefinedAt`]      | Where the property was created, for debugging.                         |
//! | [`GetUntracked`]   | Clones the current value.                                              |
//! | [`Subscribe`]      | Registers a listener for `(old, new)` change events.                   |
//! | [`Set`]            | Replaces the value, notifying listeners if it changed.                 |
//! | [`ToAnySource`]    | Converts to the type-erased [`AnySource`](crate::graph::AnySource).    |
//!
//! ## Derived Traits
//! | Trait                 | Composition                                 | Description
//! |-----------------------|---------------------------------------------|------------
//! | [`Track`]             | [`ToAnySource`]                             | Records this property in the current tracked evaluation.
//! | [`Get`]               | [`GetUntracked`] + [`Track`]                | Clones the current value, recording the read.
//! | [`Property`]          | [`GetUntracked`] + [`Subscribe`] + [`ToAnySource`] + [`DefinedAt`] | Anything observable.
//! | [`SettableProperty`]  | [`Property`] + [`Set`]                      | Anything observable that can also be written.

use crate::{
    event::{ChangeEvent, Listener},
    graph::{AnySource, Observer, Subscription},
};
pub use crate::graph::ToAnySource;
use std::{panic::Location, sync::Arc};

/// Describes where a property was created, in debug builds.
pub trait DefinedAt {
    /// Returns the location at which the property was defined, if available.
    fn defined_at(&self) -> Option<&'static Location<'static>>;
}

/// Records a read of this property in the tracked evaluation running on this thread.
pub trait Track {
    /// Registers this property with the current [`Observer`], if there is one.
    fn track(&self);
}

impl<T: ToAnySource + ?Sized> Track for T {
    fn track(&self) {
        if Observer::is_tracking() {
            Observer::record(self.to_any_source());
        }
    }
}

/// Clones the current value without recording the read.
pub trait GetUntracked {
    /// The type of the value.
    type Value;

    /// Clones and returns the current value.
    fn get_untracked(&self) -> Self::Value;
}

/// Clones the current value and records the read in the current tracked evaluation.
///
/// This is the read that lets a
/// [`MultiLevelProperty`](crate::computed::MultiLevelProperty) discover what it depends on.
pub trait Get: GetUntracked {
    /// Clones and returns the current value, tracking the read.
    fn get(&self) -> Self::Value;
}

impl<T> Get for T
where
    T: GetUntracked + Track + ?Sized,
{
    #[track_caller]
    fn get(&self) -> Self::Value {
        self.track();
        self.get_untracked()
    }
}

/// Registers listeners that are told the old and new value every time the value changes.
pub trait Subscribe: GetUntracked {
    /// Registers a shared listener. It stays registered until the returned [`Subscription`]
    /// is dropped.
    fn add_listener(&self, listener: Listener<Self::Value>) -> Subscription;

    /// Registers `listener`. It stays registered until the returned [`Subscription`] is
    /// dropped.
    fn subscribe(
        &self,
        listener: impl Fn(&ChangeEvent<Self::Value>) + Send + Sync + 'static,
    ) -> Subscription
    where
        Self: Sized,
    {
        self.add_listener(Arc::new(listener))
    }
}

/// Replaces the value of a settable property.
pub trait Set: GetUntracked {
    /// Replaces the value, notifying listeners if the new value differs from the old one.
    fn set(&self, value: Self::Value);
}

/// An observable, single-valued container.
pub trait Property<T>:
    GetUntracked<Value = T> + Subscribe + ToAnySource + DefinedAt + Send + Sync
{
}

impl<T, P> Property<T> for P where
    P: GetUntracked<Value = T>
        + Subscribe
        + ToAnySource
        + DefinedAt
        + Send
        + Sync
        + ?Sized
{
}

/// An observable, single-valued container that can also be set directly.
pub trait SettableProperty<T>: Property<T> + Set {}

impl<T, P> SettableProperty<T> for P where P: Property<T> + Set + ?Sized {}

impl<P: DefinedAt + ?Sized> DefinedAt for Arc<P> {
    fn defined_at(&self) -> Option<&'static Location<'static>> {
        (**self).defined_at()
    }
}

impl<P: ToAnySource + ?Sized> ToAnySource for Arc<P> {
    fn to_any_source(&self) -> AnySource {
        (**self).to_any_source()
    }
}

impl<P: GetUntracked + ?Sized> GetUntracked for Arc<P> {
    type Value = P::Value;

    fn get_untracked(&self) -> Self::Value {
        (**self).get_untracked()
    }
}

impl<P: Subscribe + ?Sized> Subscribe for Arc<P> {
    fn add_listener(&self, listener: Listener<Self::Value>) -> Subscription {
        (**self).add_listener(listener)
    }
}

impl<P: Set + ?Sized> Set for Arc<P> {
    fn set(&self, value: Self::Value) {
        (**self).set(value)
    }
}
