use super::{Subscription, SubscriptionId};
use crate::traits::DefinedAt;
use core::{fmt::Debug, hash::Hash};
use std::{
    any::Any,
    panic::Location,
    sync::{Arc, Weak},
};

/// A listener that only learns *that* a property changed, not what it changed to.
pub type AnyListener = Arc<dyn Fn() + Send + Sync>;

/// Converts a property to its type-erased [`AnySource`].
pub trait ToAnySource {
    /// Converts this type to its type-erased equivalent.
    fn to_any_source(&self) -> AnySource;
}

/// Describes the behavior of any property, independent of the type of its value.
pub trait Source {
    /// Registers a listener that runs whenever the value changes.
    fn add_any_listener(&self, listener: AnyListener) -> SubscriptionId;

    /// Removes a listener registered with this property. Unknown ids are ignored.
    fn remove_listener(&self, id: SubscriptionId);

    /// Clones the current value into a box.
    fn get_any(&self) -> Box<dyn Any + Send>;

    /// The number of listeners currently registered.
    fn listener_count(&self) -> usize;
}

/// A type-erased, weakly-held handle to a property.
///
/// This lets properties with different value types sit in the same collection, which is how
/// the dependency list of a [`DerivedProperty`](crate::computed::DerivedProperty) is
/// expressed. Two handles are equal when they refer to the same property.
#[derive(Clone)]
pub struct AnySource(
    pub(crate) usize,
    pub(crate) Weak<dyn Source + Send + Sync>,
    pub(crate) Option<&'static Location<'static>>,
);

impl AnySource {
    pub(crate) fn new<S>(
        inner: &Arc<S>,
        defined_at: Option<&'static Location<'static>>,
    ) -> Self
    where
        S: Source + Send + Sync + 'static,
    {
        Self(
            Arc::as_ptr(inner) as usize,
            Arc::downgrade(inner) as Weak<dyn Source + Send + Sync>,
            defined_at,
        )
    }

    /// A number that uniquely identifies the property while any handle to it exists.
    pub fn id(&self) -> usize {
        self.0
    }

    /// Whether the property still exists.
    pub fn is_alive(&self) -> bool {
        self.1.strong_count() > 0
    }

    /// Clones the current value of the property, if it still exists.
    pub fn get_any(&self) -> Option<Box<dyn Any + Send>> {
        self.1.upgrade().map(|inner| inner.get_any())
    }

    /// Runs `listener` every time the property's value changes.
    pub fn subscribe(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        self.add_any_listener(Arc::new(listener))
    }

    /// Like [`subscribe`](Self::subscribe), for a listener that is already shared.
    pub fn add_any_listener(&self, listener: AnyListener) -> Subscription {
        let id = match self.1.upgrade() {
            Some(inner) => inner.add_any_listener(listener),
            None => SubscriptionId::next(),
        };
        Subscription::new(self.clone(), id)
    }

    /// The number of listeners the property currently notifies.
    pub fn listener_count(&self) -> usize {
        self.1
            .upgrade()
            .map(|inner| inner.listener_count())
            .unwrap_or_default()
    }

    pub(crate) fn remove_listener(&self, id: SubscriptionId) {
        if let Some(inner) = self.1.upgrade() {
            inner.remove_listener(id);
        }
    }
}

impl DefinedAt for AnySource {
    fn defined_at(&self) -> Option<&'static Location<'static>> {
        self.2
    }
}

impl ToAnySource for AnySource {
    fn to_any_source(&self) -> AnySource {
        self.clone()
    }
}

impl Debug for AnySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AnySource").field(&self.0).finish()
    }
}

impl Hash for AnySource {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq for AnySource {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for AnySource {}
